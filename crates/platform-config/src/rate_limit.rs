//! Rate limiting for the public authentication endpoints.
//!
//! Login, guest login, refresh and password reset are reachable without a
//! token, so they sit behind a per-client token bucket.
//!
//! - `RATE_LIMIT_AUTH_PER_SECOND`: replenish interval in seconds (default: 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket size (default: 5)

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Seconds between token replenishments.
    pub auth_per_second: u64,

    /// Maximum tokens a single client can accumulate.
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    /// Creates a new `RateLimitConfig` from environment variables, falling
    /// back to the defaults for missing or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            auth_per_second: std::env::var("RATE_LIMIT_AUTH_PER_SECOND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_per_second),
            auth_burst_size: std::env::var("RATE_LIMIT_AUTH_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_burst_size),
        }
    }

    /// Creates a `GovernorConfig` for the authentication endpoints.
    ///
    /// Clients are keyed by `X-Forwarded-For` / `X-Real-Ip` / `Forwarded`
    /// headers, falling back to the peer address, so the limiter keeps working
    /// behind a reverse proxy.
    ///
    /// # Panics
    ///
    /// Never in practice: both values are clamped to at least 1, which is the
    /// only condition under which the builder refuses to finish.
    #[must_use]
    pub fn auth_governor_config(
        &self,
    ) -> GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware> {
        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second.max(1))
            .burst_size(self.auth_burst_size.max(1))
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("rate limiter config with non-zero period and burst")
    }
}
