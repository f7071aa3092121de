//! ES256 bearer tokens minted from an EC private key

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use common::error::{Error, Result};
use p256::ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::DecodePrivateKey;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{header_value, RequestSigner};
use crate::config::SigningScheme;

/// Lifetime of a minted token
pub const TOKEN_TTL_SECS: i64 = 120;

/// Token issuer claim
pub const TOKEN_ISSUER: &str = "cdp";

/// Token audience claim
pub const TOKEN_AUDIENCE: &str = "cdp_service";

/// JOSE header of a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub kid: String,
    pub nonce: String,
    pub typ: String,
}

/// Claims of a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    pub aud: Vec<String>,
    pub nbf: i64,
    pub exp: i64,
    /// `METHOD host/path`, without the query string
    pub uri: String,
}

/// Signs requests with a per-call ES256 bearer token
pub struct TokenSigner {
    key_name: String,
    signing_key: SigningKey,
    host: String,
}

impl TokenSigner {
    /// Create a signer from a SEC1 or PKCS#8 PEM private key.
    ///
    /// Environment variables often carry the PEM with literal `\n` sequences;
    /// those are restored to newlines before parsing.
    pub fn from_pem(key_name: &str, pem: &str, host: &str) -> Result<Self> {
        let pem = pem.trim().replace("\\n", "\n");

        let signing_key = match p256::SecretKey::from_sec1_pem(&pem) {
            Ok(secret_key) => SigningKey::from(&secret_key),
            Err(_) => SigningKey::from_pkcs8_pem(&pem)
                .map_err(|e| Error::SigningError(format!("invalid EC private key: {}", e)))?,
        };

        Ok(Self {
            key_name: key_name.to_string(),
            signing_key,
            host: host.to_string(),
        })
    }

    /// Mint a token for a request at a given Unix timestamp (seconds)
    pub fn mint_at(&self, method: &Method, path: &str, now: i64) -> Result<String> {
        let path = path.split('?').next().unwrap_or(path);

        let header = TokenHeader {
            alg: "ES256".to_string(),
            kid: self.key_name.clone(),
            nonce: hex::encode(rand::random::<[u8; 16]>()),
            typ: "JWT".to_string(),
        };
        let claims = TokenClaims {
            sub: self.key_name.clone(),
            iss: TOKEN_ISSUER.to_string(),
            aud: vec![TOKEN_AUDIENCE.to_string()],
            nbf: now,
            exp: now + TOKEN_TTL_SECS,
            uri: format!("{} {}{}", method.as_str(), self.host, path),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?),
        );

        // Fixed-length r || s, each half padded to the curve's 32-byte coordinate size
        let signature: Signature = self
            .signing_key
            .try_sign(signing_input.as_bytes())
            .map_err(|e| Error::SigningError(format!("ES256 signing failed: {}", e)))?;

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature.to_bytes())))
    }
}

impl RequestSigner for TokenSigner {
    fn scheme(&self) -> SigningScheme {
        SigningScheme::Token
    }

    fn sign(&self, method: &Method, path: &str, _body: &str) -> Result<HeaderMap> {
        // Tokens embed the exact URI and expire quickly: never reuse one
        let token = self.mint_at(method, path, Utc::now().timestamp())?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        headers.insert(CONTENT_TYPE, header_value("application/json")?);
        Ok(headers)
    }
}
