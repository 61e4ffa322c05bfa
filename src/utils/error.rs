use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Invalid input for {field} ({value}): {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{dependency} unavailable: {message}")]
    DependencyUnavailable { dependency: String, message: String },

    #[error("Degenerate input: {message}")]
    DegenerateInput { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Dependency,
    Degenerate,
    Transport,
    Config,
}

impl SplitError {
    pub fn invalid_input(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        SplitError::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn dependency(dependency: &str, message: impl Into<String>) -> Self {
        SplitError::DependencyUnavailable {
            dependency: dependency.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            // Local files and request documents are the only io and JSON sources.
            SplitError::InvalidInput { .. }
            | SplitError::CsvError(_)
            | SplitError::IoError(_)
            | SplitError::SerializationError(_) => ErrorCategory::Input,
            SplitError::DependencyUnavailable { .. } => ErrorCategory::Dependency,
            SplitError::DegenerateInput { .. } => ErrorCategory::Degenerate,
            SplitError::ApiError(_) => ErrorCategory::Transport,
            SplitError::ConfigError { .. }
            | SplitError::ConfigValidationError { .. }
            | SplitError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    /// Whether re-running the whole request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Dependency | ErrorCategory::Transport
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the request values (costs, tax percentage, group id)",
            ErrorCategory::Dependency => "The remote service did not answer as expected; retry the request",
            ErrorCategory::Degenerate => "Every member share is zero; check the receipt items",
            ErrorCategory::Transport => "Check network connectivity and the service endpoints",
            ErrorCategory::Config => "Check the settings file and required environment variables",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Degenerate => 1,
            ErrorCategory::Dependency | ErrorCategory::Transport => 2,
            ErrorCategory::Config => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_errors_are_retryable() {
        let err = SplitError::dependency("membership", "group has no members");
        assert_eq!(err.category(), ErrorCategory::Dependency);
        assert!(err.is_retryable());
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "membership unavailable: group has no members"
        );
    }

    #[test]
    fn test_input_errors_are_not_retryable() {
        let err = SplitError::invalid_input("tax_percentage", 120, "must be between 0 and 100");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(!err.is_retryable());

        let degenerate = SplitError::DegenerateInput {
            message: "all shares are zero".to_string(),
        };
        assert!(!degenerate.is_retryable());
        assert_eq!(degenerate.exit_code(), 1);
    }

    #[test]
    fn test_malformed_request_documents_are_input_errors() {
        let parse = serde_json::from_str::<crate::domain::model::TransactionRequest>(
            r#"{"tax_percentage": "ten"}"#,
        )
        .unwrap_err();
        let err = SplitError::from(parse);
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(!err.is_retryable());
        assert_eq!(err.exit_code(), 1);

        let missing = std::fs::read_to_string("/nonexistent/request.json").unwrap_err();
        let err = SplitError::from(missing);
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(!err.is_retryable());
    }
}
