//! Wire types of the brokerage REST API
//!
//! The exchange encodes every number as a string and routinely leaves fields
//! blank or absent. Response types therefore keep numeric fields as raw JSON
//! values and convert them leniently when mapping into the `common` models.

use std::str::FromStr;

use common::decimal::{parse_or_zero, to_wire_string, Price};
use common::model::account::{Account, Balance};
use common::model::market::{strip_quote_suffix, ProductTicker};
use common::model::order::OrderRequest;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lenient decimal conversion: strings and numbers parse, anything else is zero
pub(crate) fn decimal_of(value: &Value) -> Decimal {
    match value {
        Value::String(s) => parse_or_zero(s),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

/// `GET /products` response
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<ProductEntry>,
}

/// One listed product
#[derive(Debug, Deserialize)]
pub struct ProductEntry {
    pub product_id: String,
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub price_percentage_change_24h: Value,
    #[serde(default)]
    pub volume_24h: Value,
}

impl From<ProductEntry> for ProductTicker {
    fn from(entry: ProductEntry) -> Self {
        ProductTicker {
            symbol: strip_quote_suffix(&entry.product_id).to_string(),
            price: decimal_of(&entry.price),
            change_24h: decimal_of(&entry.price_percentage_change_24h),
            volume_24h: decimal_of(&entry.volume_24h),
        }
    }
}

/// `GET /accounts` response
#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

/// One exchange account
#[derive(Debug, Deserialize)]
pub struct AccountEntry {
    pub currency: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub available_balance: Option<BalanceEntry>,
}

/// Balance as reported on the wire
#[derive(Debug, Deserialize)]
pub struct BalanceEntry {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub currency: Option<String>,
}

impl From<AccountEntry> for Account {
    fn from(entry: AccountEntry) -> Self {
        let (value, currency) = match entry.available_balance {
            Some(balance) => (
                decimal_of(&balance.value).max(Decimal::ZERO),
                balance.currency.unwrap_or_else(|| entry.currency.clone()),
            ),
            None => (Decimal::ZERO, entry.currency.clone()),
        };

        Account {
            currency: entry.currency,
            name: entry.name,
            available_balance: Balance { value, currency },
        }
    }
}

/// `GET /best_bid_ask` response
#[derive(Debug, Deserialize)]
pub struct BestBidAskResponse {
    #[serde(default)]
    pub pricebooks: Vec<PriceBook>,
}

/// Top of book for one product
#[derive(Debug, Deserialize)]
pub struct PriceBook {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub bids: Vec<BookLevel>,
    #[serde(default)]
    pub asks: Vec<BookLevel>,
}

/// One price level
#[derive(Debug, Deserialize)]
pub struct BookLevel {
    #[serde(default)]
    pub price: Value,
    #[serde(default)]
    pub size: Value,
}

impl BestBidAskResponse {
    /// Best ask of the first book, zero when there is none
    pub fn best_ask(&self) -> Price {
        self.pricebooks
            .first()
            .and_then(|book| book.asks.first())
            .map(|level| decimal_of(&level.price))
            .unwrap_or(Decimal::ZERO)
    }
}

/// `POST /orders` request body
#[derive(Debug, Serialize)]
pub struct CreateOrderBody {
    pub client_order_id: String,
    pub product_id: String,
    pub side: String,
    pub order_configuration: OrderConfiguration,
}

/// Order type selector
#[derive(Debug, Serialize)]
pub struct OrderConfiguration {
    pub market_market_ioc: MarketIoc,
}

/// Immediate-or-cancel market order sizing; exactly one size is set
#[derive(Debug, Serialize)]
pub struct MarketIoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_size: Option<String>,
}

impl From<&OrderRequest> for CreateOrderBody {
    fn from(order: &OrderRequest) -> Self {
        CreateOrderBody {
            client_order_id: order.client_order_id.to_string(),
            product_id: order.product_id.clone(),
            side: order.side.as_exchange_str().to_string(),
            order_configuration: OrderConfiguration {
                market_market_ioc: MarketIoc {
                    quote_size: order.quote_size().map(to_wire_string),
                    base_size: order.base_size().map(to_wire_string),
                },
            },
        }
    }
}

/// `POST /orders` response
///
/// Both the legacy flat shape (`order_id`) and the current nested shape
/// (`success_response.order_id`) are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub success_response: Option<SuccessResponse>,
    #[serde(default)]
    pub error_response: Option<Value>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Nested success payload
#[derive(Debug, Default, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub order_id: Option<String>,
}

impl CreateOrderResponse {
    /// Exchange order id from whichever shape carried it
    pub fn order_id(&self) -> Option<String> {
        self.order_id
            .clone()
            .or_else(|| self.success_response.as_ref().and_then(|s| s.order_id.clone()))
            .filter(|id| !id.is_empty())
    }
}
