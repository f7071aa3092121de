//! Configuration for the portfolio service

use std::env;
use std::time::Duration;

/// Default bound on a single price lookup
pub const DEFAULT_PRICE_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Configuration for the portfolio service
#[derive(Debug, Clone)]
pub struct PortfolioServiceConfig {
    /// Upper bound on each best-ask lookup during valuation
    pub price_lookup_timeout: Duration,
}

impl Default for PortfolioServiceConfig {
    fn default() -> Self {
        Self {
            price_lookup_timeout: Duration::from_secs(
                env::var("PRICE_LOOKUP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PRICE_LOOKUP_TIMEOUT_SECS),
            ),
        }
    }
}

impl PortfolioServiceConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a new configuration with custom values
    pub fn new(price_lookup_timeout: Duration) -> Self {
        Self { price_lookup_timeout }
    }
}
