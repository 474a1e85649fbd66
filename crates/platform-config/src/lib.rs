//! # Platform Config
//!
//! Configuration types for the platform API, loaded from environment
//! variables once at startup:
//!
//! - [`app`]: Server address, deadlines, storage backend, guest identity
//! - [`jwt`]: Access/refresh token secrets and expiries
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: Rate limiting for the public auth endpoints
//!
//! # Example
//!
//! ```ignore
//! use platform_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! println!("binding {}", config.server_address);
//! ```

pub mod app;
pub mod cors;
pub mod jwt;
pub mod rate_limit;

// Re-export commonly used types at crate root
pub use app::{AppConfig, ConfigError, StorageBackend};
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
