
use std::time::Duration;

use common::decimal::dec;
use common::error::Error;
use common::model::order::{OrderResult, Side};
use test_helpers::{RecordingBrokerage, ScriptedChat};
use trade_assistant::session::{
    CANCELLED_MESSAGE, NOT_PENDING_MESSAGE, TRADE_FAILED_MESSAGE, UNREACHABLE_MESSAGE,
};
use trade_assistant::{
    build_system_prompt, demo_portfolio, suggestion_chips, AssistantSession, ChipVariant, Role,
    TradeState,
};
use uuid::Uuid;

const PROPOSAL: &str = "BTC is holding support. I suggest a small buy.\n\n[TRADE: type=buy, symbol=BTC, amount=100, price=67240]";

#[tokio::test]
async fn test_message_with_directive_registers_proposal() {
    let session = AssistantSession::new(None);
    let chat = ScriptedChat::new(&[PROPOSAL]);

    let reply = session
        .send_message("What should I buy?", &demo_portfolio(), false, &chat)
        .await
        .unwrap();

    assert_eq!(reply.text, "BTC is holding support. I suggest a small buy.");
    let trade = reply.trade.clone().unwrap();
    assert_eq!(trade.intent.side, Side::Buy);
    assert_eq!(trade.intent.amount, dec!(100));
    assert_eq!(session.confirmations().state(trade.id), Some(TradeState::Proposed));

    let labels: Vec<&str> = reply.chips.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Show more analysis", "Confirm trade", "Cancel"]);

    // The transcript keeps the raw reply, directive included
    let transcript = session.transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(transcript[1].role, Role::Assistant);
    assert!(transcript[1].content.contains("[TRADE:"));
}

#[tokio::test]
async fn test_request_carries_prompt_and_history() {
    let session = AssistantSession::new(None);
    let chat = ScriptedChat::new(&["First answer.", "Second answer."]);
    let portfolio = demo_portfolio();

    session.send_message("Hello", &portfolio, true, &chat).await.unwrap();
    session.send_message("Market overview", &portfolio, true, &chat).await.unwrap();

    let requests = chat.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[1].messages[0].content, "Hello");
    assert_eq!(requests[1].messages[1].content, "First answer.");
    assert_eq!(requests[1].messages[2].content, "Market overview");

    let system = requests[0].system.as_deref().unwrap();
    assert!(system.contains("Connected: Yes"));
    assert!(system.contains("[TRADE: type=buy|sell, symbol=XXX, amount=N, price=CURRENT_PRICE]"));
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let session = AssistantSession::new(None);
    let chat = ScriptedChat::new(&[]);

    let result = session.send_message("   ", &demo_portfolio(), false, &chat).await;

    assert!(matches!(result, Err(Error::ValidationError(_))));
    assert!(chat.requests.lock().unwrap().is_empty());
    assert!(session.transcript().await.is_empty());
}

#[tokio::test]
async fn test_chat_failure_becomes_reply() {
    let session = AssistantSession::new(None);
    let chat = ScriptedChat::failing();

    let reply = session
        .send_message("Analyze my portfolio", &demo_portfolio(), false, &chat)
        .await
        .unwrap();

    assert_eq!(reply.text, UNREACHABLE_MESSAGE);
    assert!(reply.trade.is_none());
}

#[tokio::test]
async fn test_confirm_trade_reply() {
    let session = AssistantSession::new(None);
    let chat = ScriptedChat::new(&[PROPOSAL]);
    let brokerage = RecordingBrokerage::accepting();

    let reply = session
        .send_message("What should I buy?", &demo_portfolio(), true, &chat)
        .await
        .unwrap();
    let trade_id = reply.trade.unwrap().id;

    let confirmed = session.confirm_trade(trade_id, &brokerage).await;
    assert!(confirmed.text.starts_with("**Order submitted successfully.**"));
    assert!(confirmed.text.contains("Your buy order for **100 BTC** at $67,240 has been placed"));
    assert!(confirmed.text.contains("Order ID: `order-1`"));
    assert_eq!(confirmed.chips[0].label, "Set stop-loss");
    assert_eq!(confirmed.chips[0].variant, Some(ChipVariant::Warn));
    assert!(confirmed.order.unwrap().accepted);

    // A second confirmation is answered without another order
    let again = session.confirm_trade(trade_id, &brokerage).await;
    assert_eq!(again.text, NOT_PENDING_MESSAGE);
    assert_eq!(brokerage.order_count(), 1);
}

#[tokio::test]
async fn test_touch_resets_idle_time() {
    let session = AssistantSession::new(None);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(session.idle_for() >= Duration::from_millis(30));

    session.touch();
    assert!(session.idle_for() < Duration::from_millis(30));
}

#[tokio::test]
async fn test_rejected_trade_reply() {
    let session = AssistantSession::new(None);
    let chat = ScriptedChat::new(&[PROPOSAL]);
    let brokerage = RecordingBrokerage::answering(Ok(OrderResult::rejected("rejected", "INSUFFICIENT_FUND")));

    let reply = session
        .send_message("What should I buy?", &demo_portfolio(), true, &chat)
        .await
        .unwrap();
    let confirmed = session.confirm_trade(reply.trade.unwrap().id, &brokerage).await;

    assert_eq!(confirmed.text, TRADE_FAILED_MESSAGE);
    assert!(!confirmed.order.unwrap().accepted);
}

#[tokio::test]
async fn test_cancel_trade_reply() {
    let session = AssistantSession::new(None);
    let chat = ScriptedChat::new(&[PROPOSAL]);

    let reply = session
        .send_message("What should I buy?", &demo_portfolio(), true, &chat)
        .await
        .unwrap();
    let trade_id = reply.trade.unwrap().id;

    assert_eq!(session.cancel_trade(trade_id).text, CANCELLED_MESSAGE);
    assert_eq!(session.cancel_trade(trade_id).text, NOT_PENDING_MESSAGE);
    assert_eq!(session.cancel_trade(Uuid::new_v4()).text, NOT_PENDING_MESSAGE);
}

#[test]
fn test_suggestion_chips() {
    let chips = suggestion_chips("There is some RISK in this market", false);
    assert_eq!(chips.len(), 1);
    assert_eq!(chips[0].label, "Hedge my portfolio");
    assert_eq!(chips[0].variant, Some(ChipVariant::Warn));

    assert!(suggestion_chips("Steady as she goes", false).is_empty());
}

#[test]
fn test_system_prompt_renders_portfolio() {
    let prompt = build_system_prompt(&demo_portfolio(), false);

    assert!(prompt.contains("- Total Value: $48,536"));
    assert!(prompt.contains("BTC: 0.4821 units @ $67,240"));
    assert!(prompt.contains("SOL: 28 units @ $178"));
    assert!(prompt.contains("Connected: No (showing demo data)"));
}
