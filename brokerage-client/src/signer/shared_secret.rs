//! Shared-secret HMAC-SHA256 signing

use chrono::Utc;
use common::error::{Error, Result};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, CONTENT_TYPE};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::{header_value, RequestSigner};
use crate::config::SigningScheme;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the key identifier
pub const ACCESS_KEY_HEADER: &str = "cb-access-key";
/// Header carrying the hex signature
pub const ACCESS_SIGN_HEADER: &str = "cb-access-sign";
/// Header carrying the signing timestamp
pub const ACCESS_TIMESTAMP_HEADER: &str = "cb-access-timestamp";

/// Exact message covered by the signature: timestamp, method, path, body with no separators
pub fn signing_message(timestamp: &str, method: &Method, path: &str, body: &str) -> String {
    format!("{}{}{}{}", timestamp, method.as_str().to_uppercase(), path, body)
}

/// Lowercase hex HMAC-SHA256 of `message` under `secret`
pub fn hmac_hex(secret: &[u8], message: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| Error::SigningError(format!("invalid HMAC key: {}", e)))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signs requests with `CB-ACCESS-*` headers
pub struct HmacSigner {
    api_key: String,
    api_secret: SecretString,
}

impl HmacSigner {
    /// Create a new HMAC signer
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret: SecretString::from(api_secret.to_string()),
        }
    }

    /// Signature for a request at a given Unix timestamp (seconds)
    pub fn signature(&self, timestamp: i64, method: &Method, path: &str, body: &str) -> Result<String> {
        let message = signing_message(&timestamp.to_string(), method, path, body);
        hmac_hex(self.api_secret.expose_secret().as_bytes(), message.as_bytes())
    }

    /// Headers for a request at a given Unix timestamp (seconds)
    pub fn sign_at(&self, timestamp: i64, method: &Method, path: &str, body: &str) -> Result<HeaderMap> {
        let signature = self.signature(timestamp, method, path, body)?;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(ACCESS_KEY_HEADER), header_value(&self.api_key)?);
        headers.insert(HeaderName::from_static(ACCESS_SIGN_HEADER), header_value(&signature)?);
        headers.insert(
            HeaderName::from_static(ACCESS_TIMESTAMP_HEADER),
            header_value(&timestamp.to_string())?,
        );
        headers.insert(CONTENT_TYPE, header_value("application/json")?);
        Ok(headers)
    }
}

impl RequestSigner for HmacSigner {
    fn scheme(&self) -> SigningScheme {
        SigningScheme::Hmac
    }

    fn sign(&self, method: &Method, path: &str, body: &str) -> Result<HeaderMap> {
        // The exchange rejects stale timestamps, so every call takes a fresh one
        self.sign_at(Utc::now().timestamp(), method, path, body)
    }
}
