//! Decoding of upstream HTTP responses
//!
//! Both the brokerage client and the text-generation client read the body as
//! text first, then classify it: malformed bodies, non-success statuses and
//! well-formed payloads each map to a distinct outcome.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Maximum number of characters of a raw upstream body kept for diagnostics
pub const MAX_EXCERPT_CHARS: usize = 500;

/// Message used when an upstream error body carries nothing more specific
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Upstream API error";

/// Bounded prefix of a raw body, cut on a character boundary.
pub fn excerpt(raw: &str) -> String {
    raw.chars().take(MAX_EXCERPT_CHARS).collect()
}

/// Pull the most specific human-readable message out of an upstream error body.
///
/// Preference: `error_details`, then `message`, then a string `error`. The same
/// lookup is applied to a nested `error_response` object, which is where the
/// exchange reports order rejections.
pub fn extract_error_message(body: &Value) -> Option<String> {
    fn non_empty(value: Option<&Value>) -> Option<String> {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn lookup(object: &Value) -> Option<String> {
        non_empty(object.get("error_details"))
            .or_else(|| non_empty(object.get("message")))
            .or_else(|| non_empty(object.get("error")))
    }

    body.get("error_response")
        .and_then(lookup)
        .or_else(|| lookup(body))
}

/// Parse a raw body as JSON without interpreting its shape.
pub fn parse_value(status: u16, raw: &str) -> Result<Value> {
    serde_json::from_str::<Value>(raw).map_err(|_| Error::UpstreamMalformed {
        status,
        excerpt: excerpt(raw),
    })
}

/// Classify an upstream response and decode the success payload into `T`.
pub fn decode_json<T>(status: u16, raw: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = parse_value(status, raw)?;

    if !(200..300).contains(&status) {
        let message = extract_error_message(&value)
            .unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string());
        return Err(Error::UpstreamProtocol {
            status,
            message,
            body: value,
        });
    }

    serde_json::from_value::<T>(value).map_err(|e| {
        tracing::warn!("Upstream payload did not match the expected shape: {}", e);
        Error::UpstreamMalformed {
            status,
            excerpt: excerpt(raw),
        }
    })
}
