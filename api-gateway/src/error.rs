//! Error handling for the API gateway

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

/// Message returned for transport failures; the cause is only logged
pub const NETWORK_FAILURE_MESSAGE: &str = "Failed to reach upstream service";

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error information
    pub error: ErrorInfo,
    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorInfo {
    /// Error code (string identifier for the error type)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Common(#[from] Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        let message = self.to_string();

        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", message, None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", message, None),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                message,
                None,
            ),
            ApiError::Common(e) => match e {
                // Client errors (4xx)
                Error::ValidationError(msg) => (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    msg.clone(),
                    None,
                ),
                Error::TradeNotPending(_) => (StatusCode::CONFLICT, "trade_not_pending", message, None),
                Error::TradeExpired(_) => (StatusCode::CONFLICT, "trade_expired", message, None),
                Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found", message, None),

                // Upstream answered with an error status: forward it
                Error::UpstreamProtocol { status, message, body } => (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    "upstream_error",
                    message.clone(),
                    Some(json!({ "status": status, "upstream": body })),
                ),

                // Server errors (5xx)
                Error::MissingCredentials { presence, .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "missing_credentials",
                    message,
                    Some(json!(presence)),
                ),
                Error::UpstreamMalformed { status, excerpt } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream_malformed",
                    message,
                    Some(json!({ "status": status, "raw": excerpt })),
                ),
                Error::Network(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "network_error",
                    NETWORK_FAILURE_MESSAGE.to_string(),
                    None,
                ),
                Error::ConfigurationError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    message,
                    None,
                ),
                Error::SigningError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "signing_error",
                    message,
                    None,
                ),
                Error::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    message,
                    None,
                ),
                Error::Serialization(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialization_error",
                    message,
                    None,
                ),
                Error::DecimalError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "decimal_error",
                    message,
                    None,
                ),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Generate a request ID for tracking errors
        let request_id = Uuid::new_v4().to_string();

        let (status, code, message, details) = self.parts();

        if status.is_server_error() {
            tracing::error!("API Error [{}]: {:?}", request_id, &self);
        } else {
            tracing::warn!("API Error [{}]: {}", request_id, &self);
        }

        let error_response = ErrorResponse {
            error: ErrorInfo {
                code: code.to_string(),
                message,
                details,
            },
            request_id: Some(request_id),
        };

        (status, Json(error_response)).into_response()
    }
}
