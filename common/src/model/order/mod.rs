//! Order models and related types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Amount, Quantity};
use crate::error::Error;
use crate::model::market::product_id;
use crate::model::trade::TradeIntent;
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Lowercase form used in directives and in the public API
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Uppercase form expected by the exchange
    pub fn as_exchange_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(Side::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(Side::Sell)
        } else {
            Err(Error::ValidationError("type must be buy or sell".to_string()))
        }
    }
}

/// How a market order is sized
///
/// Buys are sized in the quote currency (how many dollars to spend), sells in
/// the base asset (how many coins to liquidate). The exchange contract depends
/// on this asymmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSizing {
    /// Quote-currency amount to spend
    Quote(Amount),
    /// Base-asset amount to sell
    Base(Quantity),
}

impl OrderSizing {
    /// Sizing for a side and a user-facing amount
    pub fn for_side(side: Side, amount: Amount) -> Self {
        match side {
            Side::Buy => OrderSizing::Quote(amount),
            Side::Sell => OrderSizing::Base(amount),
        }
    }
}

/// Market order ready for submission to the exchange
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Caller-generated identifier the exchange uses to deduplicate submissions
    pub client_order_id: Uuid,
    /// Exchange product (e.g., "BTC-USD")
    pub product_id: String,
    /// Order side
    pub side: Side,
    /// Quote or base sizing
    pub sizing: OrderSizing,
}

impl OrderRequest {
    /// Create a new immediate-or-cancel market order.
    ///
    /// Every call mints a fresh client order id: one id per submission attempt.
    pub fn new_market(side: Side, symbol: &str, amount: Amount) -> Self {
        Self {
            client_order_id: Uuid::new_v4(),
            product_id: product_id(symbol),
            side,
            sizing: OrderSizing::for_side(side, amount),
        }
    }

    /// Build the order for a confirmed trade intent
    pub fn from_intent(intent: &TradeIntent) -> Self {
        Self::new_market(intent.side, &intent.symbol, intent.amount)
    }

    /// Quote size, present only for buys
    pub fn quote_size(&self) -> Option<Amount> {
        match self.sizing {
            OrderSizing::Quote(amount) => Some(amount),
            OrderSizing::Base(_) => None,
        }
    }

    /// Base size, present only for sells
    pub fn base_size(&self) -> Option<Quantity> {
        match self.sizing {
            OrderSizing::Base(amount) => Some(amount),
            OrderSizing::Quote(_) => None,
        }
    }
}

/// Outcome of an order submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct OrderResult {
    /// Whether the exchange accepted the order
    pub accepted: bool,
    /// Exchange order ID (when accepted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Exchange-reported status
    pub status: String,
    /// Rejection reason (when not accepted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl OrderResult {
    /// Accepted order
    pub fn accepted(order_id: Option<String>, status: impl Into<String>) -> Self {
        Self {
            accepted: true,
            order_id,
            status: status.into(),
            error_detail: None,
        }
    }

    /// Rejected order
    pub fn rejected(status: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self {
            accepted: false,
            order_id: None,
            status: status.into(),
            error_detail: Some(error_detail.into()),
        }
    }
}
