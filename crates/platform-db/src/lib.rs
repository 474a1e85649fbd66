//! Persistence for the platform API.
//!
//! The use-case layer talks to storage only through the traits in [`store`].
//! Two backends implement them:
//!
//! - [`PgStore`]: PostgreSQL via sqlx, used in production.
//! - [`MemoryStore`]: `parking_lot`-guarded maps, used by tests and local runs.
//!
//! Errors from either backend are reported as [`StoreError`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::{PgStore, init_db_pool};
pub use sqlx::PgPool;
pub use store::{
    AuditLogStore, Entity, OrganizationStore, ServiceStore, Store, Stores, UsageLogStore,
    UserStore, Visibility,
};
