use crate::core::weights::WeightScale;
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://settle-up-live.firebaseio.com";
pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3500;
pub const DEFAULT_MEMBERS_TTL_SECONDS: u64 = 86500;
pub const DEFAULT_GROUPS_TTL_SECONDS: u64 = 86500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub settle_up: SettleUpSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub transaction: TransactionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleUpSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    pub api_key: String,
    pub email: String,
    pub password: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub token_ttl_seconds: u64,
    pub members_ttl_seconds: u64,
    pub groups_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionSettings {
    pub currency: String,
    pub weight_scale: WeightScale,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            members_ttl_seconds: DEFAULT_MEMBERS_TTL_SECONDS,
            groups_ttl_seconds: DEFAULT_GROUPS_TTL_SECONDS,
        }
    }
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            currency: crate::core::payload::DEFAULT_CURRENCY.to_string(),
            weight_scale: WeightScale::Cents,
        }
    }
}

impl CacheSettings {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }

    pub fn members_ttl(&self) -> Duration {
        Duration::from_secs(self.members_ttl_seconds)
    }

    pub fn groups_ttl(&self) -> Duration {
        Duration::from_secs(self.groups_ttl_seconds)
    }
}

impl SettleUpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(30))
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SplitError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SplitError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SplitError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("settle_up.base_url", &self.settle_up.base_url)?;
        validate_url("settle_up.auth_url", &self.settle_up.auth_url)?;

        for (field, value) in [
            ("settle_up.api_key", &self.settle_up.api_key),
            ("settle_up.email", &self.settle_up.email),
            ("settle_up.password", &self.settle_up.password),
        ] {
            if value.contains("${") {
                return Err(SplitError::MissingConfigError {
                    field: format!("{} (unset variable in {})", field, value),
                });
            }
            validate_non_empty_string(field, value).map_err(|_| SplitError::MissingConfigError {
                field: field.to_string(),
            })?;
        }

        if let Some(timeout) = self.settle_up.timeout_seconds {
            validate_positive_number("settle_up.timeout_seconds", timeout, 1)?;
        }
        validate_positive_number("cache.token_ttl_seconds", self.cache.token_ttl_seconds, 1)?;

        if self.transaction.currency.len() != 3
            || !self.transaction.currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(SplitError::ConfigValidationError {
                field: "transaction.currency".to_string(),
                message: format!(
                    "'{}' is not a three-letter currency code",
                    self.transaction.currency
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[settle_up]
api_key = "key"
email = "bot@example.com"
password = "secret"
"#;

    #[test]
    fn test_parse_minimal_settings_uses_defaults() {
        let settings = Settings::from_toml_str(MINIMAL).unwrap();

        assert_eq!(settings.settle_up.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.settle_up.timeout(), Duration::from_secs(30));
        assert_eq!(settings.cache.token_ttl(), Duration::from_secs(3500));
        assert_eq!(settings.cache.members_ttl_seconds, 86500);
        assert_eq!(settings.transaction.currency, "JPY");
        assert_eq!(settings.transaction.weight_scale, WeightScale::Cents);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_full_settings() {
        let toml_content = r#"
[settle_up]
base_url = "http://localhost:9000"
auth_url = "http://localhost:9001"
api_key = "key"
email = "bot@example.com"
password = "secret"
timeout_seconds = 5

[cache]
token_ttl_seconds = 60
members_ttl_seconds = 120
groups_ttl_seconds = 180

[transaction]
currency = "EUR"
weight_scale = "units"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.settle_up.base_url, "http://localhost:9000");
        assert_eq!(settings.settle_up.timeout(), Duration::from_secs(5));
        assert_eq!(settings.cache.groups_ttl(), Duration::from_secs(180));
        assert_eq!(settings.transaction.weight_scale, WeightScale::Units);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RECEIPT_SPLIT_TEST_PASSWORD", "from-env");

        let toml_content = r#"
[settle_up]
api_key = "key"
email = "bot@example.com"
password = "${RECEIPT_SPLIT_TEST_PASSWORD}"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.settle_up.password, "from-env");

        std::env::remove_var("RECEIPT_SPLIT_TEST_PASSWORD");
    }

    #[test]
    fn test_unset_variable_fails_validation() {
        let toml_content = r#"
[settle_up]
api_key = "${RECEIPT_SPLIT_SURELY_UNSET_KEY}"
email = "bot@example.com"
password = "secret"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, SplitError::MissingConfigError { .. }));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let mut settings = Settings::from_toml_str(MINIMAL).unwrap();
        settings.settle_up.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::from_toml_str(MINIMAL).unwrap();
        settings.transaction.currency = "yen".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.settle_up.email, "bot@example.com");

        assert!(Settings::from_file("/nonexistent/settings.toml").is_err());
    }
}
