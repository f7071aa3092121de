//! Text-generation collaborator

use async_trait::async_trait;
use common::error::{CredentialPresence, Error, Result};
use common::upstream::decode_json;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::config::{ChatConfig, CHAT_SERVICE};
use crate::transcript::ChatTurn;

/// API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// System prompt plus the conversation so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

/// Produces assistant replies
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the provider's JSON response untouched
    async fn complete(&self, request: &ChatRequest) -> Result<Value>;
}

/// Assistant text of a completion response (`content[0].text`)
pub fn assistant_text(response: &Value) -> Option<String> {
    response
        .get("content")
        .and_then(|content| content.get(0))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Client for the Anthropic messages API
pub struct AnthropicChat {
    http: Client,
    api_base: String,
    api_key: Option<SecretString>,
    presence: CredentialPresence,
    model: String,
    max_tokens: u32,
}

impl AnthropicChat {
    /// Create a new client. A missing key is reported on each call.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ConfigurationError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            presence: config.presence(),
            api_base: config.api_base,
            api_key: config.api_key,
            model: config.model,
            max_tokens: config.max_tokens,
        })
    }

    fn headers(&self, api_key: &str) -> Result<HeaderMap> {
        let api_key = HeaderValue::from_str(api_key)
            .map_err(|_| Error::ConfigurationError("API key contains invalid header characters".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-api-key"), api_key);
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl ChatModel for AnthropicChat {
    async fn complete(&self, request: &ChatRequest) -> Result<Value> {
        let api_key = self.api_key.as_ref().ok_or_else(|| Error::MissingCredentials {
            service: CHAT_SERVICE.to_string(),
            presence: self.presence,
        })?;

        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": request.messages,
        });
        if let Some(system) = &request.system {
            body["system"] = Value::String(system.clone());
        }

        debug!("Requesting completion over {} turns", request.messages.len());

        let response = self
            .http
            .post(format!("{}/v1/messages", self.api_base))
            .headers(self.headers(api_key.expose_secret())?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request failed: {}", e);
                Error::Network(e.to_string())
            })?;

        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read response body: {}", e)))?;

        decode_json(status, &raw)
    }
}
