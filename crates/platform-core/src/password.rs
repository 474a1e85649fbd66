//! Password hashing and credential verification.
//!
//! Hashes are bcrypt (salted, cost-factored). The synchronous helpers do the
//! raw work; the async variants move it onto the blocking pool so a login
//! burst cannot stall the runtime workers.

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

/// Hashes a plaintext password with the default bcrypt cost.
///
/// # Errors
///
/// Returns an internal error if bcrypt fails to produce a hash.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hashes a plaintext password with an explicit bcrypt cost.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

/// Compares a candidate password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on mismatch. A malformed stored hash is an internal
/// error, not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

/// Hashes with `cost` on the blocking pool.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
        .await
        .map_err(|e| AppError::internal_error(format!("Password hashing task failed: {}", e)))?
}

/// Verifies a candidate password against the stored hash on the blocking pool.
///
/// # Errors
///
/// - `401 Unauthorized` when the password does not match
/// - `500 Internal Server Error` when the stored hash is malformed
pub async fn verify_credentials(candidate: String, stored_hash: String) -> Result<(), AppError> {
    let matches = tokio::task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
        .await
        .map_err(|e| {
            AppError::internal_error(format!("Password verification task failed: {}", e))
        })??;

    if matches {
        Ok(())
    } else {
        Err(AppError::unauthorized("Password does not match"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password_with_cost("correct horse", TEST_COST).unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password_with_cost("same", TEST_COST).unwrap();
        let b = hash_password_with_cost("same", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_malformed_hash_is_error() {
        assert!(verify_password("pw", "not_a_bcrypt_hash").is_err());
    }

    #[tokio::test]
    async fn test_verify_credentials_mismatch_is_unauthorized() {
        let hash = hash_password_with_cost("secret", TEST_COST).unwrap();
        let err = verify_credentials("wrong".to_string(), hash)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_credentials_match() {
        let hash = hash_password_with_cost("secret", TEST_COST).unwrap();
        assert!(
            verify_credentials("secret".to_string(), hash)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_verify_credentials_malformed_hash_is_internal() {
        let err = verify_credentials("secret".to_string(), "garbage".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
