use std::env;

/// Token signing parameters.
///
/// Access and refresh tokens are signed with separate secrets so a leaked
/// refresh secret cannot mint access tokens and vice versa. Expiries are in
/// hours.
#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub access_expiry_hours: i64,
    pub refresh_secret: String,
    pub refresh_expiry_hours: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            access_secret: env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|_| "access-secret-change-in-production".to_string()),
            access_expiry_hours: env::var("ACCESS_TOKEN_EXPIRY_HOUR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            refresh_secret: env::var("REFRESH_TOKEN_SECRET")
                .unwrap_or_else(|_| "refresh-secret-change-in-production".to_string()),
            refresh_expiry_hours: env::var("REFRESH_TOKEN_EXPIRY_HOUR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(168),
        }
    }
}

// Secrets stay out of logs and `#[instrument]` spans.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("access_expiry_hours", &self.access_expiry_hours)
            .field("refresh_secret", &"<redacted>")
            .field("refresh_expiry_hours", &self.refresh_expiry_hours)
            .finish()
    }
}
