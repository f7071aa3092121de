//! Chat passthrough to the text-generation service

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use common::error::Error;
use serde_json::Value;
use trade_assistant::ChatRequest;

use crate::error::ApiError;
use crate::AppState;

/// Forward a completion request and return the provider's response untouched
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Completion response from the text-generation service"),
        (status = 400, description = "No messages supplied", body = crate::error::ErrorResponse),
        (status = 500, description = "Credentials missing or service unreachable", body = crate::error::ErrorResponse)
    ),
    tag = "chat"
)]
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    if request.messages.is_empty() {
        return Err(Error::ValidationError("messages must not be empty".to_string()).into());
    }

    let response = state.chat.complete(&request).await?;

    Ok(Json(response))
}
