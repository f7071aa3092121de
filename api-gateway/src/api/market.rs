//! Market API handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use common::decimal::Price;
use common::model::market::ProductTicker;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::AppState;

/// One row of the market overview
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarketEntry {
    /// Asset symbol (e.g., "BTC")
    pub symbol: String,
    /// Last price in USD
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Price,
    /// 24h change in percent
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub change: Decimal,
    /// 24h volume
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub volume: Decimal,
}

impl From<ProductTicker> for MarketEntry {
    fn from(ticker: ProductTicker) -> Self {
        Self {
            symbol: ticker.symbol,
            price: ticker.price,
            change: ticker.change_24h,
            volume: ticker.volume_24h,
        }
    }
}

/// Market overview
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarketResponse {
    pub market: Vec<MarketEntry>,
}

/// Get the market overview for the top products
#[utoipa::path(
    get,
    path = "/api/market",
    responses(
        (status = 200, description = "Market overview retrieved successfully", body = MarketResponse),
        (status = 500, description = "Credentials missing or exchange unreachable", body = crate::error::ErrorResponse)
    ),
    tag = "market"
)]
pub async fn get_market(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MarketResponse>, ApiError> {
    let tickers = state.portfolio.market_overview().await?;

    Ok(Json(MarketResponse {
        market: tickers.into_iter().map(MarketEntry::from).collect(),
    }))
}
