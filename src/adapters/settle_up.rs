use crate::adapters::cache::TtlCache;
use crate::config::{CacheSettings, SettleUpSettings};
use crate::domain::model::{Group, GroupMember, TransactionReceipt};
use crate::domain::payload::TransactionPayload;
use crate::domain::ports::{GroupDirectory, LedgerSink, MembershipDirectory};
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::validate_group_id;
use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Signed-in identity used to authorise database reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct MemberRecord {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    #[serde(default)]
    name: Option<String>,
}

/// Caches shared by every client built from the same settings.
pub struct SettleUpCaches {
    pub sessions: TtlCache<String, Session>,
    pub members: TtlCache<String, Vec<GroupMember>>,
    pub groups: TtlCache<String, Vec<Group>>,
}

impl SettleUpCaches {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            sessions: TtlCache::new(settings.token_ttl()),
            members: TtlCache::new(settings.members_ttl()),
            groups: TtlCache::new(settings.groups_ttl()),
        }
    }
}

/// REST client for the Settle Up realtime database and its identity service.
pub struct SettleUpClient {
    client: Client,
    settings: SettleUpSettings,
    caches: Arc<SettleUpCaches>,
}

impl SettleUpClient {
    pub fn new(settings: SettleUpSettings, caches: Arc<SettleUpCaches>) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            client,
            settings,
            caches,
        })
    }

    pub fn caches(&self) -> &SettleUpCaches {
        &self.caches
    }

    pub async fn session(&self) -> Result<Session> {
        self.caches
            .sessions
            .get_or_try_insert_with(self.settings.email.clone(), || self.sign_in())
            .await
    }

    async fn sign_in(&self) -> Result<Session> {
        let url = format!(
            "{}/v1/accounts:signInWithPassword",
            self.settings.auth_url.trim_end_matches('/')
        );
        tracing::debug!("Signing in to {} as {}", url, self.settings.email);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&serde_json::json!({
                "email": self.settings.email,
                "password": self.settings.password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| SplitError::dependency("identity", e.to_string()))?;

        let body: SignInResponse = read_json(response, "identity").await?;
        tracing::debug!("Signed in as user {}", body.local_id);

        Ok(Session {
            user_id: body.local_id,
            id_token: body.id_token,
        })
    }

    fn database_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Reads one database node; a missing node comes back as `None`.
    async fn read_node<T: DeserializeOwned>(&self, path: &str, dependency: &str) -> Result<Option<T>> {
        let session = self.session().await?;
        let response = self
            .client
            .get(self.database_url(path))
            .query(&[("auth", session.id_token.as_str())])
            .send()
            .await
            .map_err(|e| SplitError::dependency(dependency, e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.caches.sessions.invalidate(&self.settings.email);
        }
        read_json(response, dependency).await
    }

    async fn fetch_members(&self, group_id: &str) -> Result<Vec<GroupMember>> {
        let records: Option<IndexMap<String, MemberRecord>> = self
            .read_node(&format!("members/{}", group_id), "membership")
            .await?;

        let members: Vec<GroupMember> = records
            .unwrap_or_default()
            .into_iter()
            .map(|(id, record)| GroupMember {
                name: record.name.unwrap_or_default(),
                id,
            })
            .collect();

        tracing::debug!("Fetched {} members of group {}", members.len(), group_id);
        Ok(members)
    }

    async fn fetch_groups(&self, user_id: &str) -> Result<Vec<Group>> {
        let memberships: Option<IndexMap<String, serde_json::Value>> = self
            .read_node(&format!("userGroups/{}", user_id), "groups")
            .await?;

        let mut groups = Vec::new();
        for group_id in memberships.unwrap_or_default().into_keys() {
            let record: Option<GroupRecord> = self
                .read_node(&format!("groups/{}", group_id), "groups")
                .await?;
            let name = record.and_then(|r| r.name).unwrap_or_default();
            groups.push(Group { id: group_id, name });
        }

        tracing::debug!("Fetched {} groups for user {}", groups.len(), user_id);
        Ok(groups)
    }
}

#[async_trait]
impl MembershipDirectory for SettleUpClient {
    async fn members(&self, group_id: &str) -> Result<Vec<GroupMember>> {
        validate_group_id("group_id", group_id)?;
        let key = group_id.to_string();
        if let Some(members) = self.caches.members.get(&key) {
            return Ok(members);
        }

        let members = self.fetch_members(group_id).await?;
        // Empty results are not cached.
        if !members.is_empty() {
            self.caches.members.insert(key, members.clone());
        }
        Ok(members)
    }
}

#[async_trait]
impl GroupDirectory for SettleUpClient {
    async fn groups(&self) -> Result<Vec<Group>> {
        let session = self.session().await?;
        self.caches
            .groups
            .get_or_try_insert_with(session.user_id.clone(), || {
                self.fetch_groups(&session.user_id)
            })
            .await
    }
}

#[async_trait]
impl LedgerSink for SettleUpClient {
    async fn create_transaction(
        &self,
        group_id: &str,
        payload: &TransactionPayload,
    ) -> Result<TransactionReceipt> {
        let session = self.session().await?;
        let url = self.database_url(&format!("transactions/{}", group_id));
        tracing::debug!(
            "Posting transaction to group {}: {}",
            group_id,
            serde_json::to_string(payload)?
        );

        let response = self
            .client
            .post(&url)
            .query(&[("auth", session.id_token.as_str())])
            .json(payload)
            .send()
            .await
            .map_err(|e| SplitError::dependency("ledger", e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.caches.sessions.invalidate(&self.settings.email);
        }
        read_json(response, "ledger").await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, dependency: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("{} answered {}: {}", dependency, status, body);
        return Err(SplitError::dependency(
            dependency,
            format!("HTTP {}: {}", status, body),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| SplitError::dependency(dependency, format!("unexpected response: {}", e)))
}
