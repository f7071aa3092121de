use common::upstream::{decode_json, excerpt, extract_error_message, MAX_EXCERPT_CHARS};
use common::Error;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Payload {
    value: u32,
}

#[test]
fn test_decode_success_payload() {
    let payload: Payload = decode_json(200, r#"{"value": 7}"#).unwrap();
    assert_eq!(payload.value, 7);
}

#[test]
fn test_non_success_status_is_forwarded() {
    let result = decode_json::<Payload>(
        403,
        r#"{"error": "PERMISSION_DENIED", "message": "Missing required scopes"}"#,
    );

    match result {
        Err(Error::UpstreamProtocol { status, message, body }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Missing required scopes");
            assert_eq!(body["error"], "PERMISSION_DENIED");
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_malformed_body_is_reported_with_bounded_excerpt() {
    let raw = "<html>".repeat(200);
    let result = decode_json::<Payload>(502, &raw);

    match result {
        Err(Error::UpstreamMalformed { status, excerpt }) => {
            assert_eq!(status, 502);
            assert_eq!(excerpt.chars().count(), MAX_EXCERPT_CHARS);
            assert!(excerpt.starts_with("<html>"));
        }
        other => panic!("expected malformed error, got {:?}", other),
    }
}

#[test]
fn test_wrong_shape_is_malformed() {
    let result = decode_json::<Payload>(200, r#"{"value": "seven"}"#);
    assert!(matches!(result, Err(Error::UpstreamMalformed { status: 200, .. })));
}

#[test]
fn test_error_message_preference() {
    let detailed = json!({
        "error": "INVALID_ARGUMENT",
        "message": "bad request",
        "error_details": "quote_size below minimum"
    });
    assert_eq!(extract_error_message(&detailed).as_deref(), Some("quote_size below minimum"));

    let generic = json!({ "error": "UNKNOWN_FAILURE_REASON" });
    assert_eq!(extract_error_message(&generic).as_deref(), Some("UNKNOWN_FAILURE_REASON"));

    let nested = json!({
        "success": false,
        "error_response": { "error": "INSUFFICIENT_FUND", "message": "Insufficient balance in source account" }
    });
    assert_eq!(
        extract_error_message(&nested).as_deref(),
        Some("Insufficient balance in source account")
    );

    assert_eq!(extract_error_message(&json!({ "details": [] })), None);
}

#[test]
fn test_excerpt_respects_char_boundaries() {
    let raw = "é".repeat(MAX_EXCERPT_CHARS + 10);
    assert_eq!(excerpt(&raw).chars().count(), MAX_EXCERPT_CHARS);
    assert_eq!(excerpt("short"), "short");
}
