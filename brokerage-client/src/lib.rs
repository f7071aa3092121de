//! Authenticated client for the brokerage REST API
//!
//! Requests are signed per call by one of two interchangeable strategies
//! (HMAC headers or a short-lived ES256 bearer token) and every response is
//! normalized into the workspace-wide `common::Error` taxonomy.

pub mod client;
pub mod config;
pub mod models;
pub mod signer;

pub use client::{Brokerage, CoinbaseClient, ORDER_FAILURE_FALLBACK};
pub use config::{BrokerageConfig, SigningScheme};
pub use signer::{build_signer, HmacSigner, RequestSigner, TokenSigner};
