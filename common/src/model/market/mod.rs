//! Market models and related types

use serde::{Deserialize, Serialize};

use crate::decimal::{Price, Quantity};
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Quote currency every product is priced in
pub const QUOTE_CURRENCY: &str = "USD";

/// Symbols valued at exactly one dollar without a market lookup
pub const USD_PEGGED: [&str; 3] = ["USD", "USDC", "USDT"];

/// Exchange product identifier for an asset symbol (e.g., "BTC" -> "BTC-USD")
pub fn product_id(symbol: &str) -> String {
    format!("{}-{}", symbol, QUOTE_CURRENCY)
}

/// Asset symbol for a product identifier (e.g., "BTC-USD" -> "BTC")
pub fn strip_quote_suffix(product_id: &str) -> &str {
    product_id
        .strip_suffix(QUOTE_CURRENCY)
        .and_then(|rest| rest.strip_suffix('-'))
        .unwrap_or(product_id)
}

/// Whether a symbol is fiat dollars or a dollar-pegged stablecoin
pub fn is_usd_pegged(symbol: &str) -> bool {
    USD_PEGGED.iter().any(|pegged| pegged.eq_ignore_ascii_case(symbol))
}

/// Ticker information for a listed product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct ProductTicker {
    /// Asset symbol with the quote suffix stripped (e.g., "BTC")
    pub symbol: String,
    /// Last price
    pub price: Price,
    /// 24h price change in percent
    pub change_24h: Price,
    /// 24h volume in base asset
    pub volume_24h: Quantity,
}

/// Best ask for an asset, as of the call that fetched it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct PriceQuote {
    /// Asset symbol
    pub symbol: String,
    /// Best ask price (zero when the book had no asks)
    pub best_ask: Price,
}
