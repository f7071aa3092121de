//! Application configuration

use std::env;

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Origin allowed by CORS when none is configured
pub const ANY_ORIGIN: &str = "*";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API port
    pub port: u16,
    /// Value of the CORS allowed origin (`*` for any)
    pub allowed_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty())
                .unwrap_or_else(|| ANY_ORIGIN.to_string()),
        }
    }
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a new configuration with custom values
    pub fn new(port: u16, allowed_origin: impl Into<String>) -> Self {
        Self {
            port,
            allowed_origin: allowed_origin.into(),
        }
    }

    /// Address to bind when none is given on the command line
    pub fn default_addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
