//! Store traits consumed by the use-case layer.
//!
//! [`Store`] covers the operations every entity shares. Entity-specific
//! queries live on the extension traits ([`UserStore`], [`ServiceStore`],
//! [`UsageLogStore`]). The audit log is append-only and has its own trait
//! with no update or delete.
//!
//! Both [`PgStore`](crate::PgStore) and [`MemoryStore`](crate::MemoryStore)
//! implement every trait with the same semantics, so the application can be
//! pointed at either through [`Stores`].

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;

use platform_models::{
    CreateServiceDto, NewOrganization, NewUsageLog, NewUser, NewUserLog, Organization, Service,
    UpdateServiceDto, UsageLog, User, UserLog, UserPatch,
};

use crate::error::StoreResult;

/// An entity managed through the generic [`Store`] operations.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Input for `create`.
    type New: Send + Sync;
    /// Input for `update`.
    type Patch: Send + Sync;
    /// Name used in error messages.
    const NAME: &'static str;
}

impl Entity for User {
    type New = NewUser;
    type Patch = UserPatch;
    const NAME: &'static str = "User";
}

impl Entity for Service {
    type New = CreateServiceDto;
    type Patch = UpdateServiceDto;
    const NAME: &'static str = "Service";
}

// Usage logs only change through `UsageLogStore::add_duration`.
impl Entity for UsageLog {
    type New = NewUsageLog;
    type Patch = Infallible;
    const NAME: &'static str = "Usage log";
}

#[async_trait]
pub trait Store<E: Entity>: Send + Sync {
    async fn create(&self, new: E::New) -> StoreResult<E>;

    async fn fetch_all(&self) -> StoreResult<Vec<E>>;

    async fn get_by_id(&self, id: i64) -> StoreResult<E>;

    /// Applies a partial update and returns the stored row.
    async fn update(&self, id: i64, patch: E::Patch) -> StoreResult<E>;

    /// Hard delete.
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

/// Whether archived users take part in a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only users that are not archived.
    Active,
    /// Every user, archived or not.
    All,
}

impl Visibility {
    pub fn admits(&self, user: &User) -> bool {
        match self {
            Self::Active => !user.is_archived,
            Self::All => true,
        }
    }
}

#[async_trait]
pub trait UserStore: Store<User> {
    async fn find_by_id(&self, id: i64, visibility: Visibility) -> StoreResult<User>;

    async fn find_by_email(&self, email: &str, visibility: Visibility) -> StoreResult<User>;

    async fn fetch_active(&self) -> StoreResult<Vec<User>>;

    /// Soft delete: sets the archived flag.
    async fn archive(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait ServiceStore: Store<Service> {
    async fn get_by_name(&self, name: &str) -> StoreResult<Service>;

    async fn get_by_organization(&self, organization_id: i64) -> StoreResult<Vec<Service>>;

    /// Services flagged for the marketing site.
    async fn get_marketing(&self) -> StoreResult<Vec<Service>>;

    /// Makes a service available to an organization. Linking twice is a
    /// no-op. Fails with `NotFound` if either side does not exist.
    async fn link_organization(&self, service_id: i64, organization_id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait UsageLogStore: Store<UsageLog> {
    /// Adds `seconds` to the log's duration in a single atomic step.
    async fn add_duration(&self, log_id: i64, seconds: i64) -> StoreResult<()>;

    async fn get_by_user(&self, user_id: i64) -> StoreResult<Vec<UsageLog>>;

    async fn get_by_service(&self, service_id: i64) -> StoreResult<Vec<UsageLog>>;
}

#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn append(&self, entry: NewUserLog) -> StoreResult<UserLog>;

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<UserLog>>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn create_organization(&self, new: NewOrganization) -> StoreResult<Organization>;

    async fn get_organization(&self, id: i64) -> StoreResult<Organization>;
}

/// Every store the application needs, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub services: Arc<dyn ServiceStore>,
    pub usage_logs: Arc<dyn UsageLogStore>,
    pub audit: Arc<dyn AuditLogStore>,
    pub organizations: Arc<dyn OrganizationStore>,
}

impl Stores {
    /// Wires one backend into every slot.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + ServiceStore + UsageLogStore + AuditLogStore + OrganizationStore + 'static,
    {
        Self {
            users: backend.clone(),
            services: backend.clone(),
            usage_logs: backend.clone(),
            audit: backend.clone(),
            organizations: backend,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
