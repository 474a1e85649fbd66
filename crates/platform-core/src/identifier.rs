//! Path identifier classification.
//!
//! `GET .../{identifier}` endpoints accept either a numeric key or a natural
//! key in the same path segment. Classification is purely syntactic and the
//! first matching rule wins.

use anyhow::anyhow;

use crate::errors::AppError;

const USER_PREFIX: &str = "user:";
const SERVICE_PREFIX: &str = "service:";

/// Lookup strategy for users and services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityIdentifier {
    /// All-digit identifier, resolved against the primary key.
    Id(i64),
    /// Anything else: email for users, name for services.
    Natural(String),
}

impl EntityIdentifier {
    /// Classifies a raw path segment.
    ///
    /// # Errors
    ///
    /// Returns `400 Bad Request` for an empty identifier or an all-digit
    /// identifier that does not fit the key type.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.is_empty() {
            return Err(invalid(raw));
        }

        if is_all_digits(raw) {
            return parse_key(raw).map(Self::Id);
        }

        Ok(Self::Natural(raw.to_string()))
    }
}

/// Lookup strategy for usage logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLogIdentifier {
    /// `42` - a single log by id.
    Id(i64),
    /// `user:42` - every log owned by the user.
    User(i64),
    /// `service:7` - every log recorded against the service.
    Service(i64),
}

impl UsageLogIdentifier {
    /// Classifies a raw path segment.
    ///
    /// # Errors
    ///
    /// Returns `400 Bad Request` for anything that is not a bare key or one of
    /// the `user:` / `service:` prefixed keys.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if is_all_digits(raw) {
            return parse_key(raw).map(Self::Id);
        }

        if let Some(rest) = raw.strip_prefix(USER_PREFIX) {
            return prefixed_key(raw, rest).map(Self::User);
        }

        if let Some(rest) = raw.strip_prefix(SERVICE_PREFIX) {
            return prefixed_key(raw, rest).map(Self::Service);
        }

        Err(invalid(raw))
    }
}

fn is_all_digits(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

fn parse_key(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| invalid(raw))
}

fn prefixed_key(raw: &str, rest: &str) -> Result<i64, AppError> {
    if !is_all_digits(rest) {
        return Err(invalid(raw));
    }
    parse_key(rest).map_err(|_| invalid(raw))
}

fn invalid(raw: &str) -> AppError {
    AppError::bad_request(anyhow!("Invalid identifier: '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_entity_numeric_is_id() {
        assert_eq!(
            EntityIdentifier::parse("42").unwrap(),
            EntityIdentifier::Id(42)
        );
    }

    #[test]
    fn test_entity_email_is_natural() {
        assert_eq!(
            EntityIdentifier::parse("a@b.com").unwrap(),
            EntityIdentifier::Natural("a@b.com".to_string())
        );
    }

    #[test]
    fn test_entity_mixed_is_natural() {
        assert_eq!(
            EntityIdentifier::parse("42abc").unwrap(),
            EntityIdentifier::Natural("42abc".to_string())
        );
    }

    #[test]
    fn test_entity_empty_is_invalid() {
        let err = EntityIdentifier::parse("").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_entity_overflow_is_invalid() {
        let err = EntityIdentifier::parse("99999999999999999999999").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_usage_log_classification() {
        assert_eq!(
            UsageLogIdentifier::parse("42").unwrap(),
            UsageLogIdentifier::Id(42)
        );
        assert_eq!(
            UsageLogIdentifier::parse("user:42").unwrap(),
            UsageLogIdentifier::User(42)
        );
        assert_eq!(
            UsageLogIdentifier::parse("service:7").unwrap(),
            UsageLogIdentifier::Service(7)
        );
    }

    #[test]
    fn test_usage_log_rejects_unknown_shapes() {
        for raw in ["abc", "", "user:", "user:abc", "service:-1", "org:3", "USER:1"] {
            let err = UsageLogIdentifier::parse(raw).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "input {raw:?}");
        }
    }

    #[test]
    fn test_usage_log_prefixed_overflow_is_invalid() {
        assert!(UsageLogIdentifier::parse("user:99999999999999999999").is_err());
    }
}
