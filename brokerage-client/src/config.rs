//! Configuration for the brokerage client

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use common::error::{CredentialPresence, Error};
use secrecy::{ExposeSecret, SecretString};

/// Default exchange API base URL
pub const DEFAULT_API_BASE: &str = "https://api.coinbase.com";

/// Path prefix of the brokerage API
pub const BROKERAGE_PREFIX: &str = "/api/v3/brokerage";

/// Name reported in credential diagnostics
pub const BROKERAGE_SERVICE: &str = "Coinbase";

/// Default timeout for a single brokerage call
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Request signing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    /// Shared-secret HMAC-SHA256 headers
    Hmac,
    /// ES256 bearer token minted from an EC private key
    Token,
}

impl FromStr for SigningScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hmac" => Ok(SigningScheme::Hmac),
            "token" | "jwt" => Ok(SigningScheme::Token),
            other => Err(Error::ConfigurationError(format!(
                "unknown signing scheme '{}', expected hmac or token",
                other
            ))),
        }
    }
}

impl fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningScheme::Hmac => f.write_str("hmac"),
            SigningScheme::Token => f.write_str("token"),
        }
    }
}

/// Configuration for the brokerage client
///
/// Loaded once at process start and handed to the client at construction.
/// Credential values are wrapped so that `Debug` never prints them.
#[derive(Debug)]
pub struct BrokerageConfig {
    /// API base URL (scheme and host, no trailing slash)
    pub api_base: String,
    /// Key identifier
    pub api_key: Option<SecretString>,
    /// HMAC secret or PEM-encoded EC private key
    pub api_secret: Option<SecretString>,
    /// Explicit signing scheme; inferred from the secret when unset
    pub signing_scheme: Option<SigningScheme>,
    /// Timeout applied to every outbound call
    pub timeout: Duration,
}

impl Default for BrokerageConfig {
    fn default() -> Self {
        Self {
            api_base: env::var("COINBASE_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_key: non_empty_secret(env::var("COINBASE_API_KEY").ok()),
            api_secret: non_empty_secret(env::var("COINBASE_API_SECRET").ok()),
            signing_scheme: env::var("COINBASE_SIGNING_SCHEME")
                .ok()
                .and_then(|s| match s.parse() {
                    Ok(scheme) => Some(scheme),
                    Err(e) => {
                        tracing::warn!("Ignoring COINBASE_SIGNING_SCHEME: {}", e);
                        None
                    }
                }),
            timeout: Duration::from_secs(
                env::var("COINBASE_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

impl BrokerageConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a new configuration with custom values
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
        signing_scheme: Option<SigningScheme>,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: non_empty_secret(api_key),
            api_secret: non_empty_secret(api_secret),
            signing_scheme,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Which credentials are present, for diagnostics
    pub fn presence(&self) -> CredentialPresence {
        CredentialPresence {
            has_key: self.api_key.is_some(),
            has_secret: Some(self.api_secret.is_some()),
        }
    }

    /// Signing scheme to use: the explicit one, or `Token` when the secret is PEM
    pub fn resolved_scheme(&self) -> SigningScheme {
        if let Some(scheme) = self.signing_scheme {
            return scheme;
        }

        match &self.api_secret {
            Some(secret) if secret.expose_secret().contains("-----BEGIN") => SigningScheme::Token,
            _ => SigningScheme::Hmac,
        }
    }

    /// Host (and port, if any) of the API base, as embedded in bearer tokens
    pub fn host(&self) -> &str {
        let without_scheme = self
            .api_base
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.api_base);
        without_scheme.split('/').next().unwrap_or(without_scheme)
    }
}

fn non_empty_secret(value: Option<String>) -> Option<SecretString> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}
