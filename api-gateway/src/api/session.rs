//! Assistant session handlers
//!
//! Drive the chat -> proposal -> confirm/cancel loop:
//! - Create a session
//! - Send a user message and get the assistant reply
//! - Confirm or cancel a proposed trade

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use trade_assistant::{demo_portfolio, AssistantReply};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::response::ApiResponse;
use crate::error::ApiError;
use crate::AppState;

/// Newly created session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// User message
#[derive(Debug, Deserialize, ToSchema)]
pub struct MessageRequest {
    pub text: String,
}

/// Create an assistant session
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses(
        (status = 201, description = "Session created", body = SessionCreated)
    ),
    tag = "session"
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, ApiResponse<SessionCreated>) {
    let session = state.open_session();
    info!("Opened assistant session {}", session.id());

    (
        StatusCode::CREATED,
        ApiResponse::new(SessionCreated {
            session_id: session.id(),
        }),
    )
}

/// Send a message to the assistant
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Assistant reply, possibly carrying a trade proposal", body = AssistantReply),
        (status = 400, description = "Empty message or malformed id", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    ),
    tag = "session"
)]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<ApiResponse<AssistantReply>, ApiError> {
    let Path(id) = path?;
    let session = state.session(id)?;
    let Json(request) = payload?;

    // The prompt describes the live portfolio when it can be fetched, demo data otherwise
    let (portfolio, connected) = match state.portfolio.snapshot().await {
        Ok(snapshot) => (snapshot, true),
        Err(e) => {
            warn!("Portfolio unavailable for session {}, using demo data: {}", id, e);
            (demo_portfolio(), false)
        }
    };

    let reply = session
        .send_message(&request.text, &portfolio, connected, state.chat.as_ref())
        .await?;

    Ok(ApiResponse::new(reply))
}

/// Confirm a proposed trade
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/trades/{trade_id}/confirm",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("trade_id" = Uuid, Path, description = "Proposal ID")
    ),
    responses(
        (status = 200, description = "Assistant reply describing the outcome", body = AssistantReply),
        (status = 400, description = "Malformed id", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    ),
    tag = "session"
)]
pub async fn confirm_trade(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<ApiResponse<AssistantReply>, ApiError> {
    let Path((id, trade_id)) = path?;
    let session = state.session(id)?;
    let reply = session.confirm_trade(trade_id, state.brokerage.as_ref()).await;

    Ok(ApiResponse::new(reply))
}

/// Cancel a proposed trade
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/trades/{trade_id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("trade_id" = Uuid, Path, description = "Proposal ID")
    ),
    responses(
        (status = 200, description = "Assistant reply acknowledging the cancellation", body = AssistantReply),
        (status = 400, description = "Malformed id", body = crate::error::ErrorResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorResponse)
    ),
    tag = "session"
)]
pub async fn cancel_trade(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<ApiResponse<AssistantReply>, ApiError> {
    let Path((id, trade_id)) = path?;
    let session = state.session(id)?;

    Ok(ApiResponse::new(session.cancel_trade(trade_id)))
}
