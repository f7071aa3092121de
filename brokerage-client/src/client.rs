//! Brokerage REST client

use async_trait::async_trait;
use common::error::{CredentialPresence, Error, Result};
use common::model::account::Account;
use common::model::market::{product_id, PriceQuote, ProductTicker};
use common::model::order::{OrderRequest, OrderResult};
use common::upstream::{decode_json, excerpt, extract_error_message, parse_value};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::config::{BrokerageConfig, BROKERAGE_PREFIX, BROKERAGE_SERVICE};
use crate::models::{
    AccountsResponse, BestBidAskResponse, CreateOrderBody, CreateOrderResponse, ProductsResponse,
};
use crate::signer::{build_signer, RequestSigner};

/// Message reported when a failed order carries no more specific reason
pub const ORDER_FAILURE_FALLBACK: &str = "Failed to execute trade";

/// Operations the desk needs from an exchange
#[async_trait]
pub trait Brokerage: Send + Sync {
    /// Ticker data for the given product ids (e.g., "BTC-USD")
    async fn list_products(&self, product_ids: &[String]) -> Result<Vec<ProductTicker>>;

    /// Every account of the authenticated user
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Best ask for an asset symbol against USD
    async fn best_ask(&self, symbol: &str) -> Result<PriceQuote>;

    /// Submit a market order. Called at most once per order request.
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult>;

    /// Whether credentials are configured for authenticated calls
    fn is_configured(&self) -> bool;
}

/// Why no signer is available
enum SignerUnavailable {
    MissingCredentials(CredentialPresence),
    UnusableKey(String),
}

/// Client for the Coinbase Advanced Trade brokerage API
pub struct CoinbaseClient {
    http: Client,
    api_base: String,
    signer: std::result::Result<Box<dyn RequestSigner>, SignerUnavailable>,
}

impl CoinbaseClient {
    /// Create a new client.
    ///
    /// Missing or unusable credentials do not fail construction: every call
    /// reports them before touching the network, so the rest of the desk keeps
    /// working unauthenticated.
    pub fn new(config: &BrokerageConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ConfigurationError(format!("failed to build HTTP client: {}", e)))?;

        let signer = match build_signer(config) {
            Ok(signer) => {
                info!("Brokerage client using {} signing", signer.scheme());
                Ok(signer)
            }
            Err(Error::MissingCredentials { presence, .. }) => {
                warn!("{} credentials not configured", BROKERAGE_SERVICE);
                Err(SignerUnavailable::MissingCredentials(presence))
            }
            Err(Error::SigningError(message)) => {
                error!("{} key material is unusable: {}", BROKERAGE_SERVICE, message);
                Err(SignerUnavailable::UnusableKey(message))
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            signer,
        })
    }

    fn signer(&self) -> Result<&dyn RequestSigner> {
        match &self.signer {
            Ok(signer) => Ok(signer.as_ref()),
            Err(SignerUnavailable::MissingCredentials(presence)) => Err(Error::MissingCredentials {
                service: BROKERAGE_SERVICE.to_string(),
                presence: *presence,
            }),
            Err(SignerUnavailable::UnusableKey(message)) => Err(Error::SigningError(message.clone())),
        }
    }

    /// Sign and send one request, returning the status and the raw body text
    async fn execute(&self, method: Method, path: &str, body: Option<String>) -> Result<(u16, String)> {
        let signer = self.signer()?;
        let payload = body.unwrap_or_default();
        let headers = signer.sign(&method, path, &payload)?;

        debug!("{} {}", method, path);

        let mut request = self
            .http
            .request(method.clone(), format!("{}{}", self.api_base, path))
            .headers(headers);
        if !payload.is_empty() {
            request = request.body(payload);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} {} failed: {}", method, path, e);
            Error::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {}", e)))?;

        if !(200..300).contains(&status) {
            warn!("{} {} returned {}: {}", method, path, status, excerpt(&raw));
        }

        Ok((status, raw))
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let (status, raw) = self.execute(Method::GET, path, None).await?;
        decode_json(status, &raw)
    }
}

#[async_trait]
impl Brokerage for CoinbaseClient {
    async fn list_products(&self, product_ids: &[String]) -> Result<Vec<ProductTicker>> {
        let query = product_ids
            .iter()
            .map(|id| format!("product_ids={}", id))
            .collect::<Vec<_>>()
            .join("&");
        let path = format!("{}/products?{}", BROKERAGE_PREFIX, query);

        let response: ProductsResponse = self.get_json(&path).await?;
        Ok(response.products.into_iter().map(ProductTicker::from).collect())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let path = format!("{}/accounts", BROKERAGE_PREFIX);

        let response: AccountsResponse = self.get_json(&path).await?;
        Ok(response.accounts.into_iter().map(Account::from).collect())
    }

    async fn best_ask(&self, symbol: &str) -> Result<PriceQuote> {
        let path = format!("{}/best_bid_ask?product_ids={}", BROKERAGE_PREFIX, product_id(symbol));

        let response: BestBidAskResponse = self.get_json(&path).await?;
        Ok(PriceQuote {
            symbol: symbol.to_string(),
            best_ask: response.best_ask(),
        })
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResult> {
        let path = format!("{}/orders", BROKERAGE_PREFIX);
        let body = serde_json::to_string(&CreateOrderBody::from(order))?;

        info!(
            "Placing {} order on {} (client order id {})",
            order.side, order.product_id, order.client_order_id
        );

        let (status, raw) = self.execute(Method::POST, &path, Some(body)).await?;
        let value = parse_value(status, &raw)?;

        if !(200..300).contains(&status) {
            let message = extract_error_message(&value)
                .unwrap_or_else(|| ORDER_FAILURE_FALLBACK.to_string());
            error!("Order {} rejected with status {}: {}", order.client_order_id, status, message);
            return Err(Error::UpstreamProtocol {
                status,
                message,
                body: value,
            });
        }

        let response: CreateOrderResponse =
            serde_json::from_value(value.clone()).map_err(|_| Error::UpstreamMalformed {
                status,
                excerpt: excerpt(&raw),
            })?;

        if response.success == Some(false) {
            let detail = extract_error_message(&value)
                .or_else(|| response.failure_reason.clone().filter(|r| !r.trim().is_empty()))
                .unwrap_or_else(|| ORDER_FAILURE_FALLBACK.to_string());
            warn!("Order {} not accepted: {}", order.client_order_id, detail);
            return Ok(OrderResult::rejected("rejected", detail));
        }

        let order_id = response.order_id();
        let status = response.status.clone().unwrap_or_else(|| "pending".to_string());
        info!("Order accepted: {:?} ({})", order_id, status);

        Ok(OrderResult::accepted(order_id, status))
    }

    fn is_configured(&self) -> bool {
        self.signer.is_ok()
    }
}
