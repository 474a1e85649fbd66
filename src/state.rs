use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use platform_config::{AppConfig, StorageBackend};
use platform_db::{MemoryStore, PgStore, Stores, init_db_pool};

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        Self {
            config: Arc::new(config),
            stores,
        }
    }
}

/// Connects the configured storage backend and builds the shared state.
///
/// The Postgres backend runs pending migrations before serving.
pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let stores = match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;
            let pool = init_db_pool(url)
                .await
                .context("Failed to connect to database")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            info!("Connected to Postgres");
            Stores::from_backend(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is not persisted");
            Stores::from_backend(Arc::new(MemoryStore::new()))
        }
    };

    Ok(AppState::new(config, stores))
}
