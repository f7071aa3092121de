//! Portfolio API handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use common::decimal::{Amount, Price, Quantity};
use common::model::account::Holding;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::AppState;

/// One valued position
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Price,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub value: Amount,
}

impl From<Holding> for PortfolioEntry {
    fn from(holding: Holding) -> Self {
        Self {
            symbol: holding.symbol,
            name: holding.name,
            amount: holding.amount,
            price: holding.price,
            value: holding.value,
        }
    }
}

/// Valued portfolio
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub portfolio: Vec<PortfolioEntry>,
    /// Sum of all holding values
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_value: Amount,
}

/// Get funded accounts valued at current prices
#[utoipa::path(
    get,
    path = "/api/portfolio",
    responses(
        (status = 200, description = "Portfolio valued successfully", body = PortfolioResponse),
        (status = 500, description = "Credentials missing or exchange unreachable", body = crate::error::ErrorResponse)
    ),
    tag = "portfolio"
)]
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioResponse>, ApiError> {
    let snapshot = state.portfolio.snapshot().await?;

    Ok(Json(PortfolioResponse {
        portfolio: snapshot.holdings.into_iter().map(PortfolioEntry::from).collect(),
        total_value: snapshot.total_value,
    }))
}
