//! Postgres-backed stores.
//!
//! Queries use the runtime `query`/`query_as` API so the crate builds
//! without a live database. Schema lives in the workspace `migrations/`.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::convert::Infallible;
use std::time::Duration;

use platform_models::{
    CreateServiceDto, NewOrganization, NewUsageLog, NewUser, NewUserLog, Organization, Service,
    UpdateServiceDto, UsageLog, User, UserLog, UserPatch,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{
    AuditLogStore, Entity, OrganizationStore, ServiceStore, Store, UsageLogStore, UserStore,
    Visibility,
};

const USER_SELECT: &str = "SELECT u.id, u.email, u.password_hash, u.display_name, u.role_id, \
     u.organization_id, o.name AS organization_name, o.role_id AS organization_role_id, \
     u.is_archived, u.created_at, u.updated_at \
     FROM users u LEFT JOIN organizations o ON o.id = u.organization_id";

const SERVICE_COLUMNS: &str = "s.id, s.name, s.marketing_name, s.description, s.app_url, \
     s.icon_url, s.screenshot_url, s.tag_line, s.benefits, s.features, s.tags, s.last_update, \
     s.status, s.price, s.is_marketing, s.created_at, s.updated_at";

const USAGE_LOG_COLUMNS: &str =
    "id, user_id, service_id, duration_seconds, created_at, updated_at";

/// Opens a connection pool against `database_url`.
///
/// # Errors
///
/// Returns the underlying sqlx error if the database is unreachable.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn user_where(&self, clause: &str, bind: UserKey<'_>) -> StoreResult<User> {
        let sql = format!("{USER_SELECT} WHERE {clause}");
        let query = sqlx::query_as::<_, User>(&sql);
        let query = match bind {
            UserKey::Id(id, visibility) => query.bind(id).bind(visibility == Visibility::All),
            UserKey::Email(email, visibility) => {
                query.bind(email).bind(visibility == Visibility::All)
            }
        };
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(e, User::NAME))
    }
}

enum UserKey<'a> {
    Id(i64, Visibility),
    Email(&'a str, Visibility),
}

fn referenced_by_constraint(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(name) if name.contains("user_id") => User::NAME,
        Some(name) if name.contains("organization_id") => "Organization",
        _ => Service::NAME,
    }
}

#[async_trait]
impl Store<User> for PgStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, password_hash, display_name, role_id, organization_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.display_name)
        .bind(new.role_id)
        .bind(new.organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx_referencing(e, User::NAME, |_| "Organization"))?;

        self.find_by_id(id, Visibility::All).await
    }

    async fn fetch_all(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY u.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<User> {
        self.find_by_id(id, Visibility::All).await
    }

    async fn update(&self, id: i64, patch: UserPatch) -> StoreResult<User> {
        let result = sqlx::query(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                password_hash = COALESCE($3, password_hash), \
                display_name = COALESCE($4, display_name), \
                role_id = COALESCE($5, role_id), \
                organization_id = COALESCE($6, organization_id), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.display_name)
        .bind(patch.role_id)
        .bind(patch.organization_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx_referencing(e, User::NAME, |_| "Organization"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(User::NAME));
        }

        self.find_by_id(id, Visibility::All).await
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(User::NAME));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: i64, visibility: Visibility) -> StoreResult<User> {
        self.user_where(
            "u.id = $1 AND ($2 OR NOT u.is_archived)",
            UserKey::Id(id, visibility),
        )
        .await
    }

    async fn find_by_email(&self, email: &str, visibility: Visibility) -> StoreResult<User> {
        self.user_where(
            "u.email = $1 AND ($2 OR NOT u.is_archived)",
            UserKey::Email(email, visibility),
        )
        .await
    }

    async fn fetch_active(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "{USER_SELECT} WHERE NOT u.is_archived ORDER BY u.id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn archive(&self, id: i64) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_archived = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(User::NAME));
        }
        Ok(())
    }
}

#[async_trait]
impl Store<Service> for PgStore {
    async fn create(&self, new: CreateServiceDto) -> StoreResult<Service> {
        sqlx::query_as::<_, Service>(&format!(
            "INSERT INTO services AS s (name, marketing_name, description, app_url, icon_url, \
             screenshot_url, tag_line, benefits, features, tags, last_update, status, price, \
             is_marketing) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.marketing_name)
        .bind(new.description)
        .bind(new.app_url)
        .bind(new.icon_url)
        .bind(new.screenshot_url)
        .bind(new.tag_line)
        .bind(new.benefits)
        .bind(new.features)
        .bind(new.tags)
        .bind(new.last_update)
        .bind(new.status)
        .bind(new.price)
        .bind(new.is_marketing)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, Service::NAME))
    }

    async fn fetch_all(&self) -> StoreResult<Vec<Service>> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services s ORDER BY s.id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<Service> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services s WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, Service::NAME))
    }

    async fn update(&self, id: i64, patch: UpdateServiceDto) -> StoreResult<Service> {
        sqlx::query_as::<_, Service>(&format!(
            "UPDATE services AS s SET \
                name = COALESCE($2, s.name), \
                marketing_name = COALESCE($3, s.marketing_name), \
                description = COALESCE($4, s.description), \
                app_url = COALESCE($5, s.app_url), \
                icon_url = COALESCE($6, s.icon_url), \
                screenshot_url = COALESCE($7, s.screenshot_url), \
                tag_line = COALESCE($8, s.tag_line), \
                benefits = COALESCE($9, s.benefits), \
                features = COALESCE($10, s.features), \
                tags = COALESCE($11, s.tags), \
                last_update = COALESCE($12, s.last_update), \
                status = COALESCE($13, s.status), \
                price = COALESCE($14, s.price), \
                is_marketing = COALESCE($15, s.is_marketing), \
                updated_at = NOW() \
             WHERE s.id = $1 \
             RETURNING {SERVICE_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.marketing_name)
        .bind(patch.description)
        .bind(patch.app_url)
        .bind(patch.icon_url)
        .bind(patch.screenshot_url)
        .bind(patch.tag_line)
        .bind(patch.benefits)
        .bind(patch.features)
        .bind(patch.tags)
        .bind(patch.last_update)
        .bind(patch.status)
        .bind(patch.price)
        .bind(patch.is_marketing)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, Service::NAME))
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(Service::NAME));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceStore for PgStore {
    async fn get_by_name(&self, name: &str) -> StoreResult<Service> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services s WHERE s.name = $1"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, Service::NAME))
    }

    async fn get_by_organization(&self, organization_id: i64) -> StoreResult<Vec<Service>> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services s \
             JOIN organization_services os ON os.service_id = s.id \
             WHERE os.organization_id = $1 ORDER BY s.id"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn get_marketing(&self) -> StoreResult<Vec<Service>> {
        sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services s WHERE s.is_marketing ORDER BY s.id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn link_organization(&self, service_id: i64, organization_id: i64) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO organization_services (organization_id, service_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(organization_id)
        .bind(service_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            StoreError::from_sqlx_referencing(e, Service::NAME, referenced_by_constraint)
        })?;
        Ok(())
    }
}

#[async_trait]
impl Store<UsageLog> for PgStore {
    async fn create(&self, new: NewUsageLog) -> StoreResult<UsageLog> {
        sqlx::query_as::<_, UsageLog>(&format!(
            "INSERT INTO user_service_logs (user_id, service_id, duration_seconds) \
             VALUES ($1, $2, 0) RETURNING {USAGE_LOG_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(new.service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx_referencing(e, UsageLog::NAME, referenced_by_constraint))
    }

    async fn fetch_all(&self) -> StoreResult<Vec<UsageLog>> {
        sqlx::query_as::<_, UsageLog>(&format!(
            "SELECT {USAGE_LOG_COLUMNS} FROM user_service_logs ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn get_by_id(&self, id: i64) -> StoreResult<UsageLog> {
        sqlx::query_as::<_, UsageLog>(&format!(
            "SELECT {USAGE_LOG_COLUMNS} FROM user_service_logs WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, UsageLog::NAME))
    }

    async fn update(&self, _id: i64, patch: Infallible) -> StoreResult<UsageLog> {
        match patch {}
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM user_service_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(UsageLog::NAME));
        }
        Ok(())
    }
}

#[async_trait]
impl UsageLogStore for PgStore {
    async fn add_duration(&self, log_id: i64, seconds: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE user_service_logs \
             SET duration_seconds = duration_seconds + $1, updated_at = NOW() \
             WHERE id = $2",
        )
        .bind(seconds)
        .bind(log_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, UsageLog::NAME))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(UsageLog::NAME));
        }
        Ok(())
    }

    async fn get_by_user(&self, user_id: i64) -> StoreResult<Vec<UsageLog>> {
        sqlx::query_as::<_, UsageLog>(&format!(
            "SELECT {USAGE_LOG_COLUMNS} FROM user_service_logs WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }

    async fn get_by_service(&self, service_id: i64) -> StoreResult<Vec<UsageLog>> {
        sqlx::query_as::<_, UsageLog>(&format!(
            "SELECT {USAGE_LOG_COLUMNS} FROM user_service_logs WHERE service_id = $1 ORDER BY id"
        ))
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }
}

#[async_trait]
impl AuditLogStore for PgStore {
    async fn append(&self, entry: NewUserLog) -> StoreResult<UserLog> {
        sqlx::query_as::<_, UserLog>(
            "INSERT INTO user_logs (user_id, action, ip_address) VALUES ($1, $2, $3) \
             RETURNING id, user_id, action, ip_address, created_at",
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.ip_address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx_referencing(e, "User log", |_| User::NAME))
    }

    async fn list_by_user(&self, user_id: i64) -> StoreResult<Vec<UserLog>> {
        sqlx::query_as::<_, UserLog>(
            "SELECT id, user_id, action, ip_address, created_at FROM user_logs \
             WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)
    }
}

#[async_trait]
impl OrganizationStore for PgStore {
    async fn create_organization(&self, new: NewOrganization) -> StoreResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (name, role_id) VALUES ($1, $2) \
             RETURNING id, name, role_id",
        )
        .bind(new.name)
        .bind(new.role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, "Organization"))
    }

    async fn get_organization(&self, id: i64) -> StoreResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, role_id FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(e, "Organization"))
    }
}
