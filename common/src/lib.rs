//! Common types and utilities for the trading desk
//!
//! This library contains the shared domain models, decimal aliases and the
//! unified error type used by every crate in the workspace, together with the
//! helpers that turn raw upstream HTTP bodies into typed results.

pub mod error;
pub mod model;
pub mod decimal;
pub mod upstream;

/// Re-export important types
pub use error::{CredentialPresence, Error, Result, ErrorExt};
pub use decimal::*;

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
