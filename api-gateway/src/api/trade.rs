//! Direct trade API handler
//!
//! Places one market order per request. Buys are sized in dollars, sells in
//! units of the asset. Orders are never retried.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use common::decimal::Amount;
use common::error::Error;
use common::model::order::{OrderRequest, OrderResult, Side};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::AppState;

/// Trade request
#[derive(Debug, Deserialize, ToSchema)]
pub struct TradeRequest {
    /// "buy" or "sell"
    #[serde(rename = "type")]
    pub side: Option<String>,
    /// Asset symbol (e.g., "BTC")
    pub symbol: Option<String>,
    /// USD to spend for buys, asset units for sells
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Amount>,
}

/// Validated trade request
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTrade {
    pub side: Side,
    pub symbol: String,
    pub amount: Amount,
}

impl TradeRequest {
    /// Check the fields before anything reaches the exchange
    pub fn validate(self) -> Result<ValidTrade, Error> {
        let (side, symbol, amount) = match (self.side, self.symbol, self.amount) {
            (Some(side), Some(symbol), Some(amount))
                if !side.trim().is_empty() && !symbol.trim().is_empty() =>
            {
                (side, symbol, amount)
            }
            _ => {
                return Err(Error::ValidationError(
                    "Missing required fields: type, symbol, amount".to_string(),
                ))
            }
        };

        let side: Side = side.trim().parse()?;

        let symbol = symbol.trim().to_uppercase();
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::ValidationError(format!("Invalid symbol: {}", symbol)));
        }

        if amount <= Amount::ZERO {
            return Err(Error::ValidationError("amount must be positive".to_string()));
        }

        Ok(ValidTrade { side, symbol, amount })
    }
}

/// Trade result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    /// Whether the exchange accepted the order
    pub success: bool,
    /// Exchange order ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Exchange-reported status
    pub status: String,
    /// Rejection reason, when the exchange refused the order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<OrderResult> for TradeResponse {
    fn from(result: OrderResult) -> Self {
        Self {
            success: result.accepted,
            order_id: result.order_id,
            status: result.status,
            error: result.error_detail,
        }
    }
}

/// Place a market order
#[utoipa::path(
    post,
    path = "/api/trade",
    request_body = TradeRequest,
    responses(
        (status = 200, description = "Order submitted; success is false when the exchange rejected it", body = TradeResponse),
        (status = 400, description = "Missing or invalid trade fields", body = crate::error::ErrorResponse),
        (status = 500, description = "Credentials missing or exchange unreachable", body = crate::error::ErrorResponse)
    ),
    tag = "trade"
)]
pub async fn place_trade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeResponse>, ApiError> {
    let Json(request) = payload?;
    let trade = request.validate()?;

    let order = OrderRequest::new_market(trade.side, &trade.symbol, trade.amount);
    info!(
        "Placing {} order {} for {} {}",
        trade.side, order.client_order_id, trade.amount, order.product_id
    );

    let result = state.brokerage.place_order(&order).await?;

    Ok(Json(TradeResponse::from(result)))
}
