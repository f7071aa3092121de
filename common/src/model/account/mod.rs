//! Account models and related types

use serde::{Deserialize, Serialize};

use crate::decimal::{Amount, Price, Quantity};
#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Balance amount with its currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Balance {
    /// Amount (non-negative)
    pub value: Quantity,
    /// Currency of the amount
    pub currency: String,
}

/// Exchange account holding a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Account {
    /// Asset symbol (e.g., "BTC", "USD")
    pub currency: String,
    /// Display name chosen by the exchange (e.g., "BTC Wallet")
    pub name: String,
    /// Available balance (not on hold)
    pub available_balance: Balance,
}

impl Account {
    /// Whether the account holds anything worth valuing
    pub fn has_balance(&self) -> bool {
        self.available_balance.value > Quantity::ZERO
    }
}

/// Valued position in a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct Holding {
    /// Asset symbol
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Amount held
    pub amount: Quantity,
    /// Unit price used for valuation
    pub price: Price,
    /// amount * price
    pub value: Amount,
}

/// Valuation of every funded account
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct PortfolioSnapshot {
    /// Per-asset holdings
    pub holdings: Vec<Holding>,
    /// Sum of holding values
    pub total_value: Amount,
}
