//! Usage log models.
//!
//! A usage log records one session of a user consuming a service. It is
//! created with zero duration when the session starts and grows only through
//! additive heartbeats.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UsageLog {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    /// Accumulated seconds of use. Never decreases.
    pub duration_seconds: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewUsageLog {
    pub user_id: i64,
    pub service_id: i64,
}

/// Result of resolving a usage-log identifier: a bare id yields one log,
/// a `user:` or `service:` key yields every matching log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UsageLogView {
    Single(UsageLog),
    Many(Vec<UsageLog>),
}
