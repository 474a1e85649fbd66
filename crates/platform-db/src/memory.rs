//! In-memory store backend.
//!
//! Implements every store trait over `parking_lot::RwLock`-guarded maps with
//! the same semantics as [`PgStore`](crate::PgStore): unique emails and
//! service names, referential checks on usage logs and organization links,
//! and heartbeat increments applied under a single write lock.
//!
//! Used by the test suites and by `STORAGE_BACKEND=memory` for local runs.
//! Data is lost when the process exits.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use platform_models::{
    CreateServiceDto, NewOrganization, NewUsageLog, NewUser, NewUserLog, Organization, Service,
    UpdateServiceDto, UsageLog, User, UserLog, UserPatch,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{
    AuditLogStore, Entity, OrganizationStore, ServiceStore, Store, UsageLogStore, UserStore,
    Visibility,
};

#[derive(Default)]
struct State {
    users: BTreeMap<i64, User>,
    organizations: BTreeMap<i64, Organization>,
    services: BTreeMap<i64, Service>,
    organization_services: BTreeSet<(i64, i64)>,
    usage_logs: BTreeMap<i64, UsageLog>,
    audit: Vec<UserLog>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Fills the organization columns the Postgres store gets from its join.
    fn hydrate(&self, mut user: User) -> User {
        let organization = user
            .organization_id
            .and_then(|id| self.organizations.get(&id));
        user.organization_name = organization.map(|o| o.name.clone());
        user.organization_role_id = organization.and_then(|o| o.role_id);
        user
    }

    fn check_organization(&self, organization_id: Option<i64>) -> StoreResult<()> {
        match organization_id {
            Some(id) if !self.organizations.contains_key(&id) => {
                Err(StoreError::not_found("Organization"))
            }
            _ => Ok(()),
        }
    }
}

/// Thread-safe in-memory backend. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryStore")
            .field("users", &state.users.len())
            .field("services", &state.services.len())
            .field("usage_logs", &state.usage_logs.len())
            .finish()
    }
}

#[async_trait]
impl Store<User> for MemoryStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let mut state = self.state.write();
        if state.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::conflict(User::NAME));
        }
        state.check_organization(new.organization_id)?;

        let now = Utc::now();
        let id = state.next_id();
        let user = User {
            id,
            email: new.email,
            password_hash: new.password_hash,
            display_name: new.display_name,
            role_id: new.role_id,
            organization_id: new.organization_id,
            organization_name: None,
            organization_role_id: None,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, user.clone());
        Ok(state.hydrate(user))
    }

    async fn fetch_all(&self) -> StoreResult<Vec<User>> {
        let state = self.state.read();
        Ok(state
            .users
            .values()
            .cloned()
            .map(|u| state.hydrate(u))
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<User> {
        self.find_by_id(id, Visibility::All).await
    }

    async fn update(&self, id: i64, patch: UserPatch) -> StoreResult<User> {
        let mut state = self.state.write();
        if let Some(email) = &patch.email {
            if state.users.values().any(|u| &u.email == email && u.id != id) {
                return Err(StoreError::conflict(User::NAME));
            }
        }
        state.check_organization(patch.organization_id)?;

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(User::NAME))?;
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        if let Some(name) = patch.display_name {
            user.display_name = name;
        }
        if let Some(role_id) = patch.role_id {
            user.role_id = role_id;
        }
        if let Some(organization_id) = patch.organization_id {
            user.organization_id = Some(organization_id);
        }
        user.updated_at = Utc::now();

        let user = user.clone();
        Ok(state.hydrate(user))
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        state
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(User::NAME))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i64, visibility: Visibility) -> StoreResult<User> {
        let state = self.state.read();
        state
            .users
            .get(&id)
            .filter(|u| visibility.admits(u))
            .cloned()
            .map(|u| state.hydrate(u))
            .ok_or_else(|| StoreError::not_found(User::NAME))
    }

    async fn find_by_email(&self, email: &str, visibility: Visibility) -> StoreResult<User> {
        let state = self.state.read();
        state
            .users
            .values()
            .find(|u| u.email == email && visibility.admits(u))
            .cloned()
            .map(|u| state.hydrate(u))
            .ok_or_else(|| StoreError::not_found(User::NAME))
    }

    async fn fetch_active(&self) -> StoreResult<Vec<User>> {
        let state = self.state.read();
        Ok(state
            .users
            .values()
            .filter(|u| !u.is_archived)
            .cloned()
            .map(|u| state.hydrate(u))
            .collect())
    }

    async fn archive(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(User::NAME))?;
        user.is_archived = true;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl Store<Service> for MemoryStore {
    async fn create(&self, new: CreateServiceDto) -> StoreResult<Service> {
        let mut state = self.state.write();
        if state
            .services
            .values()
            .any(|s| s.name == new.name || s.marketing_name == new.marketing_name)
        {
            return Err(StoreError::conflict(Service::NAME));
        }

        let now = Utc::now();
        let id = state.next_id();
        let service = Service {
            id,
            name: new.name,
            marketing_name: new.marketing_name,
            description: new.description,
            app_url: new.app_url,
            icon_url: new.icon_url,
            screenshot_url: new.screenshot_url,
            tag_line: new.tag_line,
            benefits: new.benefits,
            features: new.features,
            tags: new.tags,
            last_update: new.last_update,
            status: new.status,
            price: new.price,
            is_marketing: new.is_marketing,
            created_at: now,
            updated_at: now,
        };
        state.services.insert(id, service.clone());
        Ok(service)
    }

    async fn fetch_all(&self) -> StoreResult<Vec<Service>> {
        Ok(self.state.read().services.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Service> {
        self.state
            .read()
            .services
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Service::NAME))
    }

    async fn update(&self, id: i64, patch: UpdateServiceDto) -> StoreResult<Service> {
        let mut state = self.state.write();
        let clashes = state.services.values().any(|s| {
            s.id != id
                && (patch.name.as_ref() == Some(&s.name)
                    || patch.marketing_name.as_ref() == Some(&s.marketing_name))
        });
        if clashes {
            return Err(StoreError::conflict(Service::NAME));
        }

        let service = state
            .services
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Service::NAME))?;

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field { service.$field = value; })*
            };
        }
        macro_rules! apply_optional {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field { service.$field = Some(value); })*
            };
        }

        apply!(name, marketing_name, description, app_url, price, is_marketing);
        apply_optional!(
            icon_url,
            screenshot_url,
            tag_line,
            benefits,
            features,
            tags,
            last_update,
            status,
        );
        service.updated_at = Utc::now();

        Ok(service.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        state
            .services
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(Service::NAME))?;
        state.organization_services.retain(|(_, s)| *s != id);
        state.usage_logs.retain(|_, log| log.service_id != id);
        Ok(())
    }
}

#[async_trait]
impl ServiceStore for MemoryStore {
    async fn get_by_name(&self, name: &str) -> StoreResult<Service> {
        self.state
            .read()
            .services
            .values()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Service::NAME))
    }

    async fn get_by_organization(&self, organization_id: i64) -> StoreResult<Vec<Service>> {
        let state = self.state.read();
        Ok(state
            .organization_services
            .iter()
            .filter(|(org, _)| *org == organization_id)
            .filter_map(|(_, service_id)| state.services.get(service_id).cloned())
            .collect())
    }

    async fn get_marketing(&self) -> StoreResult<Vec<Service>> {
        Ok(self
            .state
            .read()
            .services
            .values()
            .filter(|s| s.is_marketing)
            .cloned()
            .collect())
    }

    async fn link_organization(&self, service_id: i64, organization_id: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        if !state.services.contains_key(&service_id) {
            return Err(StoreError::not_found(Service::NAME));
        }
        if !state.organizations.contains_key(&organization_id) {
            return Err(StoreError::not_found("Organization"));
        }
        state
            .organization_services
            .insert((organization_id, service_id));
        Ok(())
    }
}

#[async_trait]
impl Store<UsageLog> for MemoryStore {
    async fn create(&self, new: NewUsageLog) -> StoreResult<UsageLog> {
        let mut state = self.state.write();
        if !state.users.contains_key(&new.user_id) {
            return Err(StoreError::not_found(User::NAME));
        }
        if !state.services.contains_key(&new.service_id) {
            return Err(StoreError::not_found(Service::NAME));
        }

        let now = Utc::now();
        let id = state.next_id();
        let log = UsageLog {
            id,
            user_id: new.user_id,
            service_id: new.service_id,
            duration_seconds: 0,
            created_at: now,
            updated_at: now,
        };
        state.usage_logs.insert(id, log.clone());
        Ok(log)
    }

    async fn fetch_all(&self) -> StoreResult<Vec<UsageLog>> {
        Ok(self.state.read().usage_logs.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<UsageLog> {
        self.state
            .read()
            .usage_logs
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(UsageLog::NAME))
    }

    async fn update(&self, _id: i64, patch: Infallible) -> StoreResult<UsageLog> {
        match patch {}
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.state
            .write()
            .usage_logs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(UsageLog::NAME))
    }
}

#[async_trait]
impl UsageLogStore for MemoryStore {
    async fn add_duration(&self, log_id: i64, seconds: i64) -> StoreResult<()> {
        let mut state = self.state.write();
        let log = state
            .usage_logs
            .get_mut(&log_id)
            .ok_or_else(|| StoreError::not_found(UsageLog::NAME))?;
        log.duration_seconds = log
            .duration_seconds
            .checked_add(seconds)
            .ok_or_else(|| StoreError::out_of_range(UsageLog::NAME))?;
        log.updated_at = Utc::now();
        Ok(())
    }

    async fn get_by_user(&self, user_id: i64) -> StoreResult<Vec<UsageLog>> {
        Ok(self
            .state
            .read()
            .usage_logs
            .values()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_by_service(&self, service_id: i64) -> StoreResult<Vec<UsageLog>> {
        Ok(self
            .state
            .read()
            .usage_logs
            .values()
            .filter(|log| log.service_id == service_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditLogStore for MemoryStore {
    async fn append(&self, entry: NewUserLog) -> StoreResult<UserLog> {
        let mut state = self.state.write();
        if !state.users.contains_key(&entry.user_id) {
            return Err(StoreError::not_found(User::NAME));
        }

        let id = state.next_id();
        let log = UserLog {
            id,
            user_id: entry.user_id,
            action: entry.action.as_str().to_string(),
            ip_address: entry.ip_address,
            created_at: Utc::now(),
        };
        state.audit.push(log.clone());
        Ok(log)
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<UserLog>> {
        Ok(self
            .state
            .read()
            .audit
            .iter()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn create_organization(&self, new: NewOrganization) -> StoreResult<Organization> {
        let mut state = self.state.write();
        if state.organizations.values().any(|o| o.name == new.name) {
            return Err(StoreError::conflict("Organization"));
        }

        let id = state.next_id();
        let organization = Organization {
            id,
            name: new.name,
            role_id: new.role_id,
        };
        state.organizations.insert(id, organization.clone());
        Ok(organization)
    }

    async fn get_organization(&self, id: i64) -> StoreResult<Organization> {
        self.state
            .read()
            .organizations
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Organization"))
    }
}
