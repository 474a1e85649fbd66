//! Organization models.
//!
//! Organizations are only read here: they scope users and services. There
//! are no CRUD endpoints for them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    /// Role of the organization itself, embedded in its members' tokens.
    pub role_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganization {
    pub name: String,
    pub role_id: Option<i64>,
}
