//! API handlers
//!
//! This module contains all the API endpoint handlers organized by resource.
//! Each handler follows a consistent pattern:
//! - Extract state and parameters using Axum extractors
//! - Validate input parameters
//! - Call the appropriate service methods
//! - Map the result to the endpoint's response shape

pub mod chat;
pub mod health;
pub mod market;
pub mod portfolio;
pub mod response;
pub mod session;
pub mod trade;

use axum::http::StatusCode;

use crate::error::ApiError;

pub use response::ApiResponse;

/// Answer `OPTIONS` with an empty 200
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method a route does not serve
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Any path outside the API
pub async fn not_found() -> ApiError {
    ApiError::NotFound("no such endpoint".to_string())
}
