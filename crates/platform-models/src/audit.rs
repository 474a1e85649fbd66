//! Append-only audit log of security-relevant user actions.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    LoginGuest,
    Refresh,
    PasswordReset,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::LoginGuest => "login_guest",
            Self::Refresh => "refresh",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserLog {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub ip_address: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserLog {
    pub user_id: i64,
    pub action: AuditAction,
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(AuditAction::Login.as_str(), "login");
        assert_eq!(AuditAction::LoginGuest.to_string(), "login_guest");
        assert_eq!(
            serde_json::to_string(&AuditAction::PasswordReset).unwrap(),
            r#""password_reset""#
        );
    }
}
