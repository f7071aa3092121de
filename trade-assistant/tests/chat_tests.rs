use common::error::Error;
use mockito::{Matcher, Server};
use serde_json::json;
use trade_assistant::{assistant_text, AnthropicChat, ChatConfig, ChatModel, ChatRequest, ChatTurn};

fn request() -> ChatRequest {
    ChatRequest {
        system: Some("You are a portfolio manager.".to_string()),
        messages: vec![ChatTurn::user("Market overview")],
    }
}

#[tokio::test]
async fn test_complete_passes_response_through() {
    let mut server = Server::new_async().await;
    let response = json!({
        "id": "msg_01",
        "type": "message",
        "content": [{"type": "text", "text": "BTC is up 2% today."}],
        "usage": {"input_tokens": 12, "output_tokens": 8}
    });

    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-sonnet-4-20250514",
            "max_tokens": 1000,
            "system": "You are a portfolio manager.",
            "messages": [{"role": "user", "content": "Market overview"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(response.to_string())
        .create_async()
        .await;

    let chat = AnthropicChat::new(ChatConfig::new(server.url(), Some("test-key".to_string()))).unwrap();
    let result = chat.complete(&request()).await.unwrap();

    assert_eq!(result, response);
    assert_eq!(assistant_text(&result).as_deref(), Some("BTC is up 2% today."));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/v1/messages").expect(0).create_async().await;

    let chat = AnthropicChat::new(ChatConfig::new(server.url(), None)).unwrap();

    match chat.complete(&request()).await {
        Err(Error::MissingCredentials { service, presence }) => {
            assert_eq!(service, "Anthropic");
            assert!(!presence.has_key);
            assert_eq!(presence.has_secret, None);
        }
        other => panic!("expected missing credentials, got {:?}", other),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_error_status_is_forwarded() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(429)
        .with_body(json!({"type": "error", "error": {"type": "rate_limit_error", "message": "Rate limited"}}).to_string())
        .create_async()
        .await;

    let chat = AnthropicChat::new(ChatConfig::new(server.url(), Some("test-key".to_string()))).unwrap();

    match chat.complete(&request()).await {
        Err(Error::UpstreamProtocol { status, body, .. }) => {
            assert_eq!(status, 429);
            assert_eq!(body["error"]["type"], "rate_limit_error");
        }
        other => panic!("expected upstream protocol error, got {:?}", other),
    }
}

#[test]
fn test_assistant_text_missing() {
    assert_eq!(assistant_text(&json!({"content": []})), None);
    assert_eq!(assistant_text(&json!({"error": "boom"})), None);
}
