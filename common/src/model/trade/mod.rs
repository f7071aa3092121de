//! Trade intent models

use serde::{Deserialize, Serialize};

use crate::decimal::{Amount, Price};
use crate::model::order::Side;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// A trade proposed by the assistant, not yet executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct TradeIntent {
    /// Buy or sell
    pub side: Side,
    /// Asset symbol (e.g., "BTC")
    pub symbol: String,
    /// Amount to trade (always positive)
    #[serde(with = "rust_decimal::serde::float")]
    #[cfg_attr(feature = "utoipa", schema(value_type = f64))]
    pub amount: Amount,
    /// Price quoted by the assistant; informational only
    #[serde(with = "rust_decimal::serde::float")]
    #[cfg_attr(feature = "utoipa", schema(value_type = f64))]
    pub reference_price: Price,
}

impl TradeIntent {
    /// Estimated notional (amount * reference price), `None` when it overflows
    pub fn estimated_total(&self) -> Option<Amount> {
        self.amount.checked_mul(self.reference_price)
    }
}
