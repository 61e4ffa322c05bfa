use crate::utils::error::{Result, SplitError};
use rust_decimal::Decimal;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Characters the ledger's realtime database refuses in a key.
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SplitError::ConfigValidationError {
            field: field_name.to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SplitError::ConfigValidationError {
                field: field_name.to_string(),
                message: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SplitError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Invalid URL format '{}': {}", url_str, e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SplitError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Value {} must be at least {}", value, min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SplitError::invalid_input(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SplitError::invalid_input(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_non_negative(field_name: &str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SplitError::invalid_input(
            field_name,
            value,
            "Amount cannot be negative",
        ));
    }
    Ok(())
}

pub fn validate_group_id(field_name: &str, group_id: &str) -> Result<()> {
    validate_non_empty_string(field_name, group_id)?;

    if let Some(c) = group_id
        .chars()
        .find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_whitespace() || c.is_control())
    {
        return Err(SplitError::invalid_input(
            field_name,
            group_id,
            format!("Group id contains forbidden character {:?}", c),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("settle_up.base_url", "https://example.com").is_ok());
        assert!(validate_url("settle_up.base_url", "http://example.com").is_ok());
        assert!(validate_url("settle_up.base_url", "").is_err());
        assert!(validate_url("settle_up.base_url", "invalid-url").is_err());
        assert!(validate_url("settle_up.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("tax_percentage", dec!(10), dec!(0), dec!(100)).is_ok());
        assert!(validate_range("tax_percentage", dec!(100), dec!(0), dec!(100)).is_ok());
        assert!(validate_range("tax_percentage", dec!(100.5), dec!(0), dec!(100)).is_err());
        assert!(validate_range("tax_percentage", dec!(-1), dec!(0), dec!(100)).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("cost", dec!(0)).is_ok());
        assert!(validate_non_negative("cost", dec!(-0)).is_ok());
        assert!(validate_non_negative("cost", dec!(12.5)).is_ok());
        assert!(validate_non_negative("cost", dec!(-0.01)).is_err());
    }

    #[test]
    fn test_validate_group_id() {
        assert!(validate_group_id("group_id", "-O_65sO713JKnTgmQpCt").is_ok());
        assert!(validate_group_id("group_id", "").is_err());
        assert!(validate_group_id("group_id", "   ").is_err());
        assert!(validate_group_id("group_id", "groups/abc").is_err());
        assert!(validate_group_id("group_id", "a.b").is_err());
        assert!(validate_group_id("group_id", "a b").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("cache.token_ttl_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("cache.token_ttl_seconds", 0, 1).is_err());
    }
}
