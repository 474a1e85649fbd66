//! Top-level application configuration.
//!
//! Built once at startup and handed to every constructor that needs it.
//! Nothing reads the environment after [`AppConfig::from_env`] returns.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cors::CorsConfig;
use crate::jwt::JwtConfig;
use crate::rate_limit::RateLimitConfig;

const DEFAULT_BCRYPT_COST: u32 = 12;
/// Work factors bcrypt accepts.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// A setting that is present but unusable. Startup aborts on these instead
/// of falling back to a default.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("STORAGE_BACKEND: {0}")]
    StorageBackend(String),

    #[error("BCRYPT_COST: '{0}' is not a work factor between 4 and 31")]
    BcryptCost(String),
}

/// Which store implementation backs the application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_address: String,
    /// Deadline applied to every use-case call.
    pub context_timeout: Duration,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    /// Email of the pre-provisioned account that guest sessions log in as.
    pub guest_email: String,
    /// bcrypt work factor for newly hashed passwords.
    pub bcrypt_cost: u32,
    pub metrics_enabled: bool,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

/// Unset selects Postgres. An unknown name is an error.
pub fn parse_storage_backend(raw: Option<String>) -> Result<StorageBackend, ConfigError> {
    match raw {
        None => Ok(StorageBackend::default()),
        Some(value) => value.parse().map_err(ConfigError::StorageBackend),
    }
}

pub fn parse_bcrypt_cost(raw: Option<String>) -> Result<u32, ConfigError> {
    let Some(value) = raw else {
        return Ok(DEFAULT_BCRYPT_COST);
    };
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|cost| BCRYPT_COST_RANGE.contains(cost))
        .ok_or(ConfigError::BcryptCost(value))
}

impl AppConfig {
    /// # Errors
    ///
    /// Fails when `STORAGE_BACKEND` or `BCRYPT_COST` is set to a value that
    /// cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            context_timeout: Duration::from_secs(
                env::var("CONTEXT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            storage_backend: parse_storage_backend(env::var("STORAGE_BACKEND").ok())?,
            database_url: env::var("DATABASE_URL").ok(),
            guest_email: env::var("GUEST_USER_EMAIL")
                .unwrap_or_else(|_| "guest@platform.local".to_string()),
            bcrypt_cost: parse_bcrypt_cost(env::var("BCRYPT_COST").ok())?,
            metrics_enabled: env::var("METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            jwt: JwtConfig::from_env(),
            cors: CorsConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        })
    }
}
