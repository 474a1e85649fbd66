//! Token issuance and validation.
//!
//! Tokens are JWS compact strings signed with HMAC-SHA256. Validation only
//! accepts the HMAC family (HS256/HS384/HS512); any other algorithm named in
//! the header (RS*, ES*, EdDSA, `none`) is rejected before the key is used.
//! Expiry is enforced with zero leeway and there is no revocation list, so a
//! token stays valid until its embedded `exp`.
//!
//! # Example
//!
//! ```ignore
//! use platform_auth::{TokenSubject, issue_token_pair, verify_access_token};
//! use platform_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let pair = issue_token_pair(&subject, &config)?;
//!
//! let claims = verify_access_token(&pair.access_token, &config)?;
//! assert_eq!(claims.user_id()?, subject.user_id);
//! ```

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use uuid::Uuid;

use platform_config::JwtConfig;
use platform_core::AppError;

use crate::claims::{Claims, TokenSubject, TokenUse, decode_subject, encode_subject};

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
const SECONDS_PER_HOUR: i64 = 3600;

/// Freshly issued access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Creates a signed access token.
///
/// # Arguments
///
/// * `subject` - Identity and authorization data to embed
/// * `secret` - Access token signing secret
/// * `expiry_hours` - Lifetime of the token in hours
///
/// # Errors
///
/// Returns an internal error if signing fails.
pub fn create_access_token(
    subject: &TokenSubject,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, AppError> {
    sign(subject, TokenUse::Access, secret, expiry_hours)
        .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Creates a signed refresh token.
///
/// Structurally identical to an access token but marked
/// `token_use = refresh` and signed with the refresh secret.
///
/// # Errors
///
/// Returns an internal error if signing fails.
pub fn create_refresh_token(
    subject: &TokenSubject,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, AppError> {
    sign(subject, TokenUse::Refresh, secret, expiry_hours)
        .map_err(|e| AppError::internal_error(format!("Failed to create refresh token: {}", e)))
}

/// Issues an access token followed by a refresh token, using the secrets and
/// expiries from `jwt_config`. Every login path goes through here.
pub fn issue_token_pair(
    subject: &TokenSubject,
    jwt_config: &JwtConfig,
) -> Result<TokenPair, AppError> {
    let access_token = create_access_token(
        subject,
        &jwt_config.access_secret,
        jwt_config.access_expiry_hours,
    )?;
    let refresh_token = create_refresh_token(
        subject,
        &jwt_config.refresh_secret,
        jwt_config.refresh_expiry_hours,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Verifies a token's algorithm, signature and expiry and returns its claims.
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - the header names a non-HMAC algorithm
/// - the signature does not match `secret`
/// - the token has expired or is malformed
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let header = decode_header(token).map_err(|_| invalid_token())?;
    if !HMAC_ALGORITHMS.contains(&header.alg) {
        return Err(AppError::unauthorized("Unsupported token algorithm"));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| invalid_token())
}

/// Verifies a token and returns the numeric user key from its hex subject.
pub fn extract_subject_id(token: &str, secret: &str) -> Result<i64, AppError> {
    let claims = validate_token(token, secret)?;
    decode_subject(&claims.sub)
}

/// Verifies an access token against the access secret.
///
/// A refresh token is rejected even if it happens to be signed with the same
/// secret.
pub fn verify_access_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let claims = validate_token(token, &jwt_config.access_secret)?;
    expect_use(claims, TokenUse::Access)
}

/// Verifies a refresh token against the refresh secret.
pub fn verify_refresh_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let claims = validate_token(token, &jwt_config.refresh_secret)
        .map_err(|_| AppError::unauthorized("Invalid or expired refresh token"))?;
    expect_use(claims, TokenUse::Refresh)
}

fn sign(
    subject: &TokenSubject,
    token_use: TokenUse,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let exp = now.saturating_add(expiry_hours.saturating_mul(SECONDS_PER_HOUR));

    let claims = Claims {
        sub: encode_subject(subject.user_id),
        name: subject.display_name.clone(),
        organization_id: subject.organization_id,
        organization_role_id: subject.organization_role_id,
        user_role_id: subject.user_role_id,
        api_admin: subject.api_admin,
        token_use,
        jti: Uuid::new_v4().to_string(),
        exp: exp.max(0) as usize,
        iat: now as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn expect_use(claims: Claims, expected: TokenUse) -> Result<Claims, AppError> {
    if claims.token_use != expected {
        return Err(AppError::unauthorized("Wrong token type"));
    }
    Ok(claims)
}

fn invalid_token() -> AppError {
    AppError::unauthorized("Invalid or expired token")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "test-access-secret-at-least-32-characters";
    const REFRESH_SECRET: &str = "test-refresh-secret-at-least-32-characters";

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            access_secret: ACCESS_SECRET.to_string(),
            access_expiry_hours: 1,
            refresh_secret: REFRESH_SECRET.to_string(),
            refresh_expiry_hours: 24,
        }
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: 42,
            display_name: "Ada".to_string(),
            organization_id: Some(7),
            organization_role_id: Some(2),
            user_role_id: 3,
            api_admin: false,
        }
    }

    fn status(err: &AppError) -> u16 {
        err.status.as_u16()
    }

    #[test]
    fn test_create_and_validate_access_token() {
        let token = create_access_token(&subject(), ACCESS_SECRET, 1).unwrap();
        let claims = validate_token(&token, ACCESS_SECRET).unwrap();

        assert_eq!(claims.sub, "2a");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.organization_id, Some(7));
        assert_eq!(claims.organization_role_id, Some(2));
        assert_eq!(claims.user_role_id, 3);
        assert!(!claims.api_admin);
        assert_eq!(claims.token_use, TokenUse::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let token = create_access_token(&subject(), ACCESS_SECRET, 1).unwrap();
        let err = validate_token(&token, "different-secret-key-at-least-32-chars").unwrap_err();
        assert_eq!(status(&err), 401);
    }

    #[test]
    fn test_validate_token_invalid() {
        assert!(validate_token("invalid-token", ACCESS_SECRET).is_err());
        assert!(validate_token("", ACCESS_SECRET).is_err());
    }

    #[test]
    fn test_validate_token_expired() {
        let token = create_access_token(&subject(), ACCESS_SECRET, -1).unwrap();
        assert!(validate_token(&token, ACCESS_SECRET).is_err());
    }

    #[test]
    fn test_validate_rejects_rs256_header() {
        let token = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxIn0.c2ln";
        let err = validate_token(token, ACCESS_SECRET).unwrap_err();
        assert_eq!(status(&err), 401);
    }

    #[test]
    fn test_validate_rejects_none_header() {
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiIxIn0.";
        assert!(validate_token(token, ACCESS_SECRET).is_err());
    }

    #[test]
    fn test_validate_accepts_other_hmac_variants() {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "2a".to_string(),
            name: "Ada".to_string(),
            organization_id: None,
            organization_role_id: None,
            user_role_id: 3,
            api_admin: false,
            token_use: TokenUse::Access,
            jti: Uuid::new_v4().to_string(),
            exp: now + 600,
            iat: now,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, ACCESS_SECRET).is_ok());
    }

    #[test]
    fn test_extract_subject_id() {
        let token = create_access_token(&subject(), ACCESS_SECRET, 1).unwrap();
        assert_eq!(extract_subject_id(&token, ACCESS_SECRET).unwrap(), 42);
        assert!(extract_subject_id(&token, REFRESH_SECRET).is_err());
    }

    #[test]
    fn test_issue_token_pair_uses_separate_secrets() {
        let config = get_test_jwt_config();
        let pair = issue_token_pair(&subject(), &config).unwrap();

        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);

        assert!(verify_access_token(&pair.access_token, &config).is_ok());
        assert!(verify_refresh_token(&pair.refresh_token, &config).is_ok());
        assert!(verify_access_token(&pair.refresh_token, &config).is_err());
        assert!(verify_refresh_token(&pair.access_token, &config).is_err());
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let config = get_test_jwt_config();
        let pair = issue_token_pair(&subject(), &config).unwrap();
        let claims = verify_refresh_token(&pair.refresh_token, &config).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_token_use_checked_even_with_shared_secret() {
        let mut config = get_test_jwt_config();
        config.refresh_secret = config.access_secret.clone();
        let pair = issue_token_pair(&subject(), &config).unwrap();

        let err = verify_access_token(&pair.refresh_token, &config).unwrap_err();
        assert_eq!(status(&err), 401);
    }

    #[test]
    fn test_tokens_have_unique_jti() {
        let a = create_access_token(&subject(), ACCESS_SECRET, 1).unwrap();
        let b = create_access_token(&subject(), ACCESS_SECRET, 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_api_admin_round_trips() {
        let mut admin = subject();
        admin.api_admin = true;
        let token = create_access_token(&admin, ACCESS_SECRET, 1).unwrap();
        assert!(validate_token(&token, ACCESS_SECRET).unwrap().api_admin);
    }
}
