//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Per-client-IP limits via tower_governor.

use crate::error::ConfigError;
use governor::middleware::StateInformationMiddleware;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config keyed by peer IP, with X-RateLimit-* headers
pub type DashboardGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Requests allowed immediately
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // A dashboard polls several endpoints per refresh
        Self {
            enabled: true,
            per_second: 1,
            burst_size: 20,
        }
    }
}

/// Build the governor config
///
/// Needs `into_make_service_with_connect_info::<SocketAddr>()` for IP extraction.
pub fn create_governor_config(
    config: &RateLimitConfig,
) -> Result<Arc<DashboardGovernorConfig>, ConfigError> {
    GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .finish()
        .map(Arc::new)
        .ok_or_else(|| {
            ConfigError::Invalid(format!(
                "rate limit per_second={} burst_size={} is not usable",
                config.per_second, config.burst_size
            ))
        })
}
