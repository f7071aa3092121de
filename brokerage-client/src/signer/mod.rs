//! Request signing strategies
//!
//! A signer turns `(method, path, body)` into the authentication headers for a
//! single call. Headers embed a timestamp or an expiring token, so they are
//! produced fresh for every request and never cached.

mod shared_secret;
mod bearer_token;

pub use self::shared_secret::{hmac_hex, signing_message, HmacSigner};
pub use self::bearer_token::{TokenClaims, TokenHeader, TokenSigner, TOKEN_TTL_SECS};

use common::error::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::Method;
use secrecy::ExposeSecret;

use crate::config::{BrokerageConfig, SigningScheme, BROKERAGE_SERVICE};

/// Produces authentication headers for one brokerage call
pub trait RequestSigner: Send + Sync {
    /// Strategy implemented by this signer
    fn scheme(&self) -> SigningScheme;

    /// Sign a request. `path` includes the query string; `body` is the exact
    /// payload that will be sent (empty for GET).
    fn sign(&self, method: &Method, path: &str, body: &str) -> Result<HeaderMap>;
}

/// Build the signer selected by the configuration.
///
/// Missing credentials and unusable key material are reported here, before
/// any network call is attempted.
pub fn build_signer(config: &BrokerageConfig) -> Result<Box<dyn RequestSigner>> {
    let (api_key, api_secret) = match (&config.api_key, &config.api_secret) {
        (Some(key), Some(secret)) => (key.expose_secret(), secret.expose_secret()),
        _ => {
            return Err(Error::MissingCredentials {
                service: BROKERAGE_SERVICE.to_string(),
                presence: config.presence(),
            })
        }
    };

    match config.resolved_scheme() {
        SigningScheme::Hmac => Ok(Box::new(HmacSigner::new(api_key, api_secret))),
        SigningScheme::Token => Ok(Box::new(TokenSigner::from_pem(
            api_key,
            api_secret,
            config.host(),
        )?)),
    }
}

pub(crate) fn header_value(value: &str) -> Result<reqwest::header::HeaderValue> {
    reqwest::header::HeaderValue::from_str(value)
        .map_err(|_| Error::SigningError("credential contains characters not allowed in a header".to_string()))
}
