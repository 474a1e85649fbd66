//! JWT claim structures for session tokens.
//!
//! Access and refresh tokens share one claim layout. The [`TokenUse`] claim
//! keeps them apart so a refresh token is never accepted as an access token
//! (and the other way round), on top of each kind being signed with its own
//! secret.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use platform_core::AppError;

/// Which kind of session token a claim set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Identity and authorization data embedded at issuance time.
///
/// Built by the session service from a stored user so that token issuance
/// needs no further lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: i64,
    pub display_name: String,
    pub organization_id: Option<i64>,
    pub organization_role_id: Option<i64>,
    pub user_role_id: i64,
    /// Grants access to administrative routes. Only ever read back from a
    /// verified token.
    pub api_admin: bool,
}

/// JWT claims for access and refresh tokens.
///
/// # Fields
///
/// - `sub`: User ID, lower-case hex
/// - `name`: Display name of the user
/// - `organization_id` / `organization_role_id`: Tenant scope
/// - `user_role_id`: Role reference of the user
/// - `api_admin`: Elevated-privilege flag
/// - `token_use`: `access` or `refresh`
/// - `jti`: Random token id
/// - `exp` / `iat`: Unix timestamps
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim), hex encoded
    pub sub: String,
    /// Display name
    pub name: String,
    pub organization_id: Option<i64>,
    pub organization_role_id: Option<i64>,
    pub user_role_id: i64,
    #[serde(default)]
    pub api_admin: bool,
    pub token_use: TokenUse,
    /// Unique token identifier (JWT ID)
    pub jti: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// Decodes the hex subject back into the numeric user key.
    ///
    /// # Errors
    ///
    /// Returns `401 Unauthorized` if the subject is not valid hex or does not
    /// fit the key type.
    pub fn user_id(&self) -> Result<i64, AppError> {
        decode_subject(&self.sub)
    }
}

pub(crate) fn encode_subject(user_id: i64) -> String {
    format!("{:x}", user_id)
}

pub(crate) fn decode_subject(sub: &str) -> Result<i64, AppError> {
    if sub.is_empty() {
        return Err(AppError::unauthorized("Invalid subject in token"));
    }
    i64::from_str_radix(sub, 16).map_err(|_| AppError::unauthorized("Invalid subject in token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_hex_round_trip() {
        assert_eq!(encode_subject(255), "ff");
        assert_eq!(decode_subject("ff").unwrap(), 255);
        assert_eq!(decode_subject(&encode_subject(42)).unwrap(), 42);
    }

    #[test]
    fn test_decode_subject_rejects_garbage() {
        assert!(decode_subject("").is_err());
        assert!(decode_subject("not-hex").is_err());
        assert!(decode_subject("ffffffffffffffffffff").is_err());
    }

    #[test]
    fn test_token_use_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenUse::Refresh).unwrap(),
            r#""refresh""#
        );
    }

    #[test]
    fn test_claims_deserialize_defaults_api_admin() {
        let json = r#"{"sub":"2a","name":"Ada","organization_id":3,"organization_role_id":null,"user_role_id":3,"token_use":"access","jti":"x","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(!claims.api_admin);
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.organization_id, Some(3));
        assert_eq!(claims.token_use, TokenUse::Access);
    }
}
