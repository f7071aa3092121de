//! Error types for the trading desk
//!
//! This module provides the unified error taxonomy shared by the signer, the
//! brokerage client, the assistant workflow and the HTTP boundary. Every
//! failure is a value: the gateway turns them into structured JSON bodies with
//! a stable status code.

use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

/// Which pieces of credential material were present when a call was attempted.
///
/// Only presence is ever reported, never the values themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPresence {
    /// Whether a key identifier was configured
    pub has_key: bool,
    /// Whether secret material was configured (absent for single-key services)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_secret: Option<bool>,
}

/// Trading desk error type
#[derive(Debug, Error)]
pub enum Error {
    /// Required credentials are missing or empty
    #[error("{service} credentials not configured")]
    MissingCredentials {
        /// Upstream service the credentials belong to
        service: String,
        /// Presence flags for each credential
        presence: CredentialPresence,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Credential material could not be used to sign a request
    #[error("Signing error: {0}")]
    SigningError(String),

    /// Upstream answered with a non-success status
    #[error("Upstream API error ({status}): {message}")]
    UpstreamProtocol {
        /// HTTP status returned by the upstream
        status: u16,
        /// Most specific message that could be extracted from the body
        message: String,
        /// Normalized upstream body
        body: serde_json::Value,
    },

    /// Upstream answered with a body that is not valid JSON for the expected shape
    #[error("Upstream returned malformed data (status {status})")]
    UpstreamMalformed {
        /// HTTP status returned by the upstream
        status: u16,
        /// Bounded prefix of the raw body
        excerpt: String,
    },

    /// Transport-level failure talking to an upstream
    #[error("Network error: {0}")]
    Network(String),

    /// Caller-supplied data failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A trade proposal is unknown or already resolved
    #[error("Trade not pending: {0}")]
    TradeNotPending(String),

    /// A trade proposal outlived its confirmation window
    #[error("Trade expired: {0}")]
    TradeExpired(String),

    /// An assistant session cannot be found
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(String),
}

impl Error {
    /// Whether the failure is a transport problem that a user may retry by hand.
    ///
    /// Nothing in the workspace retries automatically, order placement least of all.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
                Error::SigningError(msg) => Error::SigningError(format!("{}: {}", context, msg)),
                Error::Network(msg) => Error::Network(format!("{}: {}", context, msg)),
                Error::ValidationError(msg) => Error::ValidationError(format!("{}: {}", context, msg)),
                Error::TradeNotPending(msg) => Error::TradeNotPending(format!("{}: {}", context, msg)),
                Error::TradeExpired(msg) => Error::TradeExpired(format!("{}: {}", context, msg)),
                Error::SessionNotFound(msg) => Error::SessionNotFound(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                Error::DecimalError(msg) => Error::DecimalError(format!("{}: {}", context, msg)),
                // Structured variants carry upstream data that must reach the caller untouched
                other @ (Error::MissingCredentials { .. }
                | Error::UpstreamProtocol { .. }
                | Error::UpstreamMalformed { .. }
                | Error::Serialization(_)) => other,
            }
        })
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}
