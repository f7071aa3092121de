use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brokerage_client::Brokerage;
use common::decimal::{dec, Price};
use common::error::{CredentialPresence, Error, Result};
use common::model::account::{Account, Balance};
use common::model::market::{PriceQuote, ProductTicker};
use common::model::order::{OrderRequest, OrderResult};
use portfolio_service::{value_holdings, PortfolioService, PortfolioServiceConfig, TOP_PRODUCTS};
use rust_decimal::Decimal;

/// In-memory exchange with canned balances and prices
#[derive(Default)]
struct FakeBrokerage {
    accounts: Vec<Account>,
    prices: HashMap<String, Price>,
    failing: Vec<String>,
    slow: Vec<String>,
    lookups: AtomicUsize,
    unconfigured: bool,
}

impl FakeBrokerage {
    fn with_account(mut self, currency: &str, amount: Price) -> Self {
        self.accounts.push(account(currency, amount));
        self
    }

    fn with_price(mut self, symbol: &str, price: Price) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

fn account(currency: &str, amount: Price) -> Account {
    Account {
        currency: currency.to_string(),
        name: format!("{} Wallet", currency),
        available_balance: Balance {
            value: amount,
            currency: currency.to_string(),
        },
    }
}

#[async_trait]
impl Brokerage for FakeBrokerage {
    async fn list_products(&self, product_ids: &[String]) -> Result<Vec<ProductTicker>> {
        Ok(product_ids
            .iter()
            .map(|id| ProductTicker {
                symbol: id.trim_end_matches("-USD").to_string(),
                price: dec!(1),
                change_24h: dec!(0),
                volume_24h: dec!(0),
            })
            .collect())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        if self.unconfigured {
            return Err(Error::MissingCredentials {
                service: "Coinbase".to_string(),
                presence: CredentialPresence {
                    has_key: false,
                    has_secret: Some(false),
                },
            });
        }
        Ok(self.accounts.clone())
    }

    async fn best_ask(&self, symbol: &str) -> Result<PriceQuote> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.slow.iter().any(|s| s == symbol) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.failing.iter().any(|s| s == symbol) {
            return Err(Error::Network("connection reset".to_string()));
        }
        Ok(PriceQuote {
            symbol: symbol.to_string(),
            best_ask: self.prices.get(symbol).copied().unwrap_or(dec!(0)),
        })
    }

    async fn place_order(&self, _order: &OrderRequest) -> Result<OrderResult> {
        Err(Error::Internal("orders are not supported here".to_string()))
    }

    fn is_configured(&self) -> bool {
        !self.unconfigured
    }
}

fn service(brokerage: FakeBrokerage) -> (Arc<FakeBrokerage>, PortfolioService) {
    let brokerage = Arc::new(brokerage);
    let config = PortfolioServiceConfig::new(Duration::from_millis(200));
    let service = PortfolioService::new(brokerage.clone(), &config);
    (brokerage, service)
}

#[test]
fn test_value_holdings_btc_and_cash() {
    let accounts = vec![account("BTC", dec!(0.5)), account("USD", dec!(1000))];
    let prices = HashMap::from([("BTC".to_string(), dec!(70000))]);

    let snapshot = value_holdings(&accounts, &prices);

    assert_eq!(snapshot.holdings.len(), 2);
    assert_eq!(snapshot.holdings[0].symbol, "BTC");
    assert_eq!(snapshot.holdings[0].price, dec!(70000));
    assert_eq!(snapshot.holdings[0].value, dec!(35000));
    assert_eq!(snapshot.holdings[1].price, dec!(1));
    assert_eq!(snapshot.holdings[1].value, dec!(1000));
    assert_eq!(snapshot.total_value, dec!(36000));
}

#[test]
fn test_value_holdings_missing_price_is_zero() {
    let accounts = vec![account("ETH", dec!(2)), account("USDC", dec!(50)), account("SOL", dec!(0))];

    let snapshot = value_holdings(&accounts, &HashMap::new());

    // Zero balances are skipped
    assert_eq!(snapshot.holdings.len(), 2);
    assert_eq!(snapshot.holdings[0].price, dec!(0));
    assert_eq!(snapshot.holdings[0].value, dec!(0));
    assert_eq!(snapshot.total_value, dec!(50));
}

#[test]
fn test_value_holdings_total_never_overflows() {
    let accounts = vec![account("USD", Decimal::MAX), account("USDC", Decimal::MAX)];

    let snapshot = value_holdings(&accounts, &HashMap::new());

    assert_eq!(snapshot.holdings.len(), 2);
    assert_eq!(snapshot.holdings[1].value, Decimal::MAX);
    assert_eq!(snapshot.total_value, Decimal::MAX);
}

#[tokio::test]
async fn test_snapshot_values_funded_accounts() {
    let brokerage = FakeBrokerage::default()
        .with_account("BTC", dec!(0.5))
        .with_account("USD", dec!(1000))
        .with_account("DOGE", dec!(0))
        .with_price("BTC", dec!(70000));
    let (brokerage, service) = service(brokerage);

    let snapshot = service.snapshot().await.unwrap();

    assert_eq!(snapshot.holdings.len(), 2);
    assert_eq!(snapshot.total_value, dec!(36000));
    // Only BTC needs a market lookup
    assert_eq!(brokerage.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_snapshot_tolerates_failed_lookup() {
    let mut brokerage = FakeBrokerage::default()
        .with_account("BTC", dec!(0.5))
        .with_account("ETH", dec!(2))
        .with_price("BTC", dec!(70000))
        .with_price("ETH", dec!(3000));
    brokerage.failing.push("ETH".to_string());
    let (_, service) = service(brokerage);

    let snapshot = service.snapshot().await.unwrap();

    let eth = snapshot.holdings.iter().find(|h| h.symbol == "ETH").unwrap();
    assert_eq!(eth.price, dec!(0));
    assert_eq!(eth.value, dec!(0));
    assert_eq!(snapshot.total_value, dec!(35000));
}

#[tokio::test]
async fn test_snapshot_bounds_slow_lookup() {
    let mut brokerage = FakeBrokerage::default()
        .with_account("BTC", dec!(1))
        .with_account("SOL", dec!(10))
        .with_price("BTC", dec!(70000))
        .with_price("SOL", dec!(150));
    brokerage.slow.push("SOL".to_string());
    let (_, service) = service(brokerage);

    let started = std::time::Instant::now();
    let snapshot = service.snapshot().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    let sol = snapshot.holdings.iter().find(|h| h.symbol == "SOL").unwrap();
    assert_eq!(sol.value, dec!(0));
    assert_eq!(snapshot.total_value, dec!(70000));
}

#[tokio::test]
async fn test_snapshot_propagates_account_failure() {
    let brokerage = FakeBrokerage {
        unconfigured: true,
        ..Default::default()
    };
    let (_, service) = service(brokerage);

    assert!(!service.is_connected());
    assert!(matches!(
        service.snapshot().await,
        Err(Error::MissingCredentials { .. })
    ));
}

#[tokio::test]
async fn test_market_overview_lists_top_products() {
    let (_, service) = service(FakeBrokerage::default());

    let tickers = service.market_overview().await.unwrap();

    assert_eq!(tickers.len(), TOP_PRODUCTS.len());
    assert_eq!(tickers[0].symbol, "BTC");
    assert_eq!(tickers[9].symbol, "ADA");
}
