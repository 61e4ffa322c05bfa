use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Keyed values that expire a fixed time after insertion.
///
/// Entries are evicted lazily on read. The lock is never held across an
/// `.await`, so two callers racing on a cold key may both run the loader;
/// the later insert wins.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        let (expires_at, value) = entries.get(key)?;
        if Instant::now() < *expires_at {
            return Some(value.clone());
        }

        entries.remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.lock().insert(key, (expires_at, value));
    }

    pub fn invalidate(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the cached value, or runs `load` and caches its success.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = load().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, (Instant, V)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_inserted_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("token".to_string(), 42);

        assert_eq!(cache.get(&"token".to_string()), Some(42));
        assert_eq!(cache.get(&"other".to_string()), None);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert(1, "value");

        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(1, 'a');
        cache.insert(2, 'b');

        cache.invalidate(&1);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with_loads_once() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let mut loads = 0;

        let first: Result<u32, String> = cache
            .get_or_try_insert_with("k", || {
                loads += 1;
                async { Ok(7) }
            })
            .await;
        let second: Result<u32, String> = cache
            .get_or_try_insert_with("k", || async { Ok(8) })
            .await;

        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
        assert_eq!(loads, 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));

        let failed: Result<u32, String> = cache
            .get_or_try_insert_with("k", || async { Err("down".to_string()) })
            .await;

        assert!(failed.is_err());
        assert!(cache.get(&"k").is_none());
    }
}
