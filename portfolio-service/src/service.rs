//! Portfolio service implementation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use brokerage_client::Brokerage;
use common::decimal::Price;
use common::error::{ErrorExt, Result};
use common::model::account::{Account, PortfolioSnapshot};
use common::model::market::{is_usd_pegged, ProductTicker};
use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::PortfolioServiceConfig;
use crate::valuation::value_holdings;

/// Products shown in the market overview
pub const TOP_PRODUCTS: [&str; 10] = [
    "BTC-USD", "ETH-USD", "SOL-USD", "BNB-USD", "XRP-USD",
    "DOGE-USD", "AVAX-USD", "DOT-USD", "LINK-USD", "ADA-USD",
];

/// Portfolio service for market data and position valuation
pub struct PortfolioService {
    /// Exchange access
    brokerage: Arc<dyn Brokerage>,
    /// Upper bound on each price lookup
    price_lookup_timeout: Duration,
}

impl PortfolioService {
    /// Create a new portfolio service
    pub fn new(brokerage: Arc<dyn Brokerage>, config: &PortfolioServiceConfig) -> Self {
        Self {
            brokerage,
            price_lookup_timeout: config.price_lookup_timeout,
        }
    }

    /// Whether the underlying exchange client has credentials
    pub fn is_connected(&self) -> bool {
        self.brokerage.is_configured()
    }

    /// Ticker data for the fixed list of top products
    pub async fn market_overview(&self) -> Result<Vec<ProductTicker>> {
        let product_ids: Vec<String> = TOP_PRODUCTS.iter().map(|id| id.to_string()).collect();

        self.brokerage
            .list_products(&product_ids)
            .await
            .with_context(|| "Failed to fetch market overview")
    }

    /// Value every funded account at current best-ask prices.
    ///
    /// Price lookups run concurrently and each one is bounded by the configured
    /// timeout. A failed or slow lookup values that holding at zero instead of
    /// failing the snapshot.
    pub async fn snapshot(&self) -> Result<PortfolioSnapshot> {
        let accounts: Vec<Account> = self
            .brokerage
            .list_accounts()
            .await
            .with_context(|| "Failed to list accounts")?
            .into_iter()
            .filter(Account::has_balance)
            .collect();

        let mut symbols: Vec<&str> = accounts
            .iter()
            .map(|account| account.currency.as_str())
            .filter(|symbol| !is_usd_pegged(symbol))
            .collect();
        symbols.sort_unstable();
        symbols.dedup();

        debug!("Looking up prices for {} assets", symbols.len());

        let prices: HashMap<String, Price> = join_all(symbols.into_iter().map(|symbol| self.lookup_price(symbol)))
            .await
            .into_iter()
            .flatten()
            .collect();

        let snapshot = value_holdings(&accounts, &prices);
        info!(
            "Valued {} holdings, total {}",
            snapshot.holdings.len(),
            snapshot.total_value
        );

        Ok(snapshot)
    }

    async fn lookup_price(&self, symbol: &str) -> Option<(String, Price)> {
        match timeout(self.price_lookup_timeout, self.brokerage.best_ask(symbol)).await {
            Ok(Ok(quote)) => Some((symbol.to_string(), quote.best_ask)),
            Ok(Err(e)) => {
                warn!("Price lookup for {} failed: {}", symbol, e);
                None
            }
            Err(_) => {
                warn!(
                    "Price lookup for {} timed out after {:?}",
                    symbol, self.price_lookup_timeout
                );
                None
            }
        }
    }
}
