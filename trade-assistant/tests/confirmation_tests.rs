
use std::sync::Arc;
use std::time::Duration;

use common::decimal::dec;
use common::error::Error;
use common::model::order::{OrderResult, OrderSizing, Side};
use common::model::trade::TradeIntent;
use test_helpers::RecordingBrokerage;
use trade_assistant::{TradeConfirmations, TradeState, RESOLVED_HISTORY};
use uuid::Uuid;

fn intent(side: Side, symbol: &str, amount: rust_decimal::Decimal) -> TradeIntent {
    TradeIntent {
        side,
        symbol: symbol.to_string(),
        amount,
        reference_price: dec!(67240),
    }
}

#[tokio::test]
async fn test_confirm_buy_uses_quote_size() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::accepting();

    let proposal = confirmations.propose(intent(Side::Buy, "BTC", dec!(100)));
    assert_eq!(confirmations.state(proposal.id), Some(TradeState::Proposed));
    assert_eq!(proposal.estimated_total, Some(dec!(6724000)));

    let confirmed = confirmations.confirm(proposal.id, &brokerage).await.unwrap();
    assert!(confirmed.result.accepted);
    assert_eq!(confirmations.state(proposal.id), Some(TradeState::Confirmed));

    let orders = brokerage.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].product_id, "BTC-USD");
    assert_eq!(orders[0].sizing, OrderSizing::Quote(dec!(100)));
    assert_eq!(orders[0].quote_size(), Some(dec!(100)));
    assert_eq!(orders[0].base_size(), None);
    assert_eq!(orders[0].client_order_id, confirmed.client_order_id);
}

#[tokio::test]
async fn test_confirm_sell_uses_base_size() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::accepting();

    let proposal = confirmations.propose(intent(Side::Sell, "ETH", dec!(2)));
    confirmations.confirm(proposal.id, &brokerage).await.unwrap();

    let orders = brokerage.orders.lock().unwrap();
    assert_eq!(orders[0].side, Side::Sell);
    assert_eq!(orders[0].base_size(), Some(dec!(2)));
    assert_eq!(orders[0].quote_size(), None);
}

#[tokio::test]
async fn test_distinct_client_order_ids() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::accepting();

    let first = confirmations.propose(intent(Side::Buy, "BTC", dec!(50)));
    let second = confirmations.propose(intent(Side::Buy, "BTC", dec!(50)));
    assert_ne!(first.id, second.id);

    let a = confirmations.confirm(first.id, &brokerage).await.unwrap();
    let b = confirmations.confirm(second.id, &brokerage).await.unwrap();

    assert_ne!(a.client_order_id, b.client_order_id);
    assert_eq!(brokerage.order_count(), 2);
}

#[tokio::test]
async fn test_reconfirm_is_rejected() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::accepting();

    let proposal = confirmations.propose(intent(Side::Buy, "SOL", dec!(20)));
    confirmations.confirm(proposal.id, &brokerage).await.unwrap();

    let again = confirmations.confirm(proposal.id, &brokerage).await;
    assert!(matches!(again, Err(Error::TradeNotPending(_))));
    assert!(matches!(confirmations.cancel(proposal.id), Err(Error::TradeNotPending(_))));
    assert_eq!(brokerage.order_count(), 1);
    assert_eq!(confirmations.state(proposal.id), Some(TradeState::Confirmed));
}

#[tokio::test]
async fn test_concurrent_confirms_place_one_order() {
    let confirmations = Arc::new(TradeConfirmations::default());
    let brokerage = Arc::new(RecordingBrokerage::accepting());
    let id = confirmations.propose(intent(Side::Buy, "BTC", dec!(10))).id;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let confirmations = confirmations.clone();
        let brokerage = brokerage.clone();
        handles.push(tokio::spawn(async move {
            confirmations.confirm(id, brokerage.as_ref()).await.is_ok()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(brokerage.order_count(), 1);
}

#[tokio::test]
async fn test_cancel_makes_no_order() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::accepting();

    let proposal = confirmations.propose(intent(Side::Buy, "ADA", dec!(30)));
    let cancelled = confirmations.cancel(proposal.id).unwrap();
    assert_eq!(cancelled.symbol, "ADA");
    assert_eq!(confirmations.state(proposal.id), Some(TradeState::Cancelled));

    let confirm = confirmations.confirm(proposal.id, &brokerage).await;
    assert!(matches!(confirm, Err(Error::TradeNotPending(_))));
    assert_eq!(brokerage.order_count(), 0);
}

#[tokio::test]
async fn test_unknown_id_is_not_pending() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::accepting();
    let unknown = Uuid::new_v4();

    assert_eq!(confirmations.state(unknown), None);
    assert!(matches!(
        confirmations.confirm(unknown, &brokerage).await,
        Err(Error::TradeNotPending(_))
    ));
}

#[tokio::test]
async fn test_expired_proposal_is_not_submitted() {
    let confirmations = TradeConfirmations::new(Some(Duration::from_millis(20)));
    let brokerage = RecordingBrokerage::accepting();

    let proposal = confirmations.propose(intent(Side::Buy, "BTC", dec!(10)));
    assert!(proposal.expires_at.is_some());

    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = confirmations.confirm(proposal.id, &brokerage).await;
    assert!(matches!(result, Err(Error::TradeExpired(_))));
    assert_eq!(confirmations.state(proposal.id), Some(TradeState::Expired));
    assert_eq!(brokerage.order_count(), 0);
}

#[tokio::test]
async fn test_submission_failure_is_terminal() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::answering(Err(Error::Network("timeout".to_string())));

    let proposal = confirmations.propose(intent(Side::Buy, "BTC", dec!(10)));
    assert!(matches!(
        confirmations.confirm(proposal.id, &brokerage).await,
        Err(Error::Network(_))
    ));

    // No automatic or manual retry through the same proposal
    assert!(matches!(
        confirmations.confirm(proposal.id, &brokerage).await,
        Err(Error::TradeNotPending(_))
    ));
    assert_eq!(brokerage.order_count(), 1);
}

#[tokio::test]
async fn test_rejected_order_is_reported() {
    let confirmations = TradeConfirmations::default();
    let brokerage = RecordingBrokerage::answering(Ok(OrderResult::rejected("rejected", "INSUFFICIENT_FUND")));

    let proposal = confirmations.propose(intent(Side::Buy, "BTC", dec!(10)));
    let confirmed = confirmations.confirm(proposal.id, &brokerage).await.unwrap();

    assert!(!confirmed.result.accepted);
    assert_eq!(confirmed.result.error_detail.as_deref(), Some("INSUFFICIENT_FUND"));
}

#[test]
fn test_overflowing_notional_is_proposed_without_total() {
    let confirmations = TradeConfirmations::default();
    let proposal = confirmations.propose(TradeIntent {
        side: Side::Buy,
        symbol: "BTC".to_string(),
        amount: dec!(100000000000000000),
        reference_price: dec!(100000000000000),
    });

    assert_eq!(proposal.estimated_total, None);
    assert_eq!(confirmations.state(proposal.id), Some(TradeState::Proposed));
}

#[test]
fn test_resolved_history_is_bounded() {
    let confirmations = TradeConfirmations::default();
    let ids: Vec<Uuid> = (0..RESOLVED_HISTORY + 1)
        .map(|_| {
            let proposal = confirmations.propose(intent(Side::Buy, "BTC", dec!(1)));
            confirmations.cancel(proposal.id).unwrap();
            proposal.id
        })
        .collect();

    // The oldest outcome is forgotten but its id still cannot be confirmed
    assert_eq!(confirmations.state(ids[0]), None);
    assert_eq!(confirmations.state(ids[1]), Some(TradeState::Cancelled));
    assert_eq!(confirmations.state(ids[RESOLVED_HISTORY]), Some(TradeState::Cancelled));
    assert!(matches!(confirmations.cancel(ids[0]), Err(Error::TradeNotPending(_))));
}

#[test]
fn test_pending_lists_open_proposals() {
    let confirmations = TradeConfirmations::default();
    let first = confirmations.propose(intent(Side::Buy, "BTC", dec!(1)));
    let second = confirmations.propose(intent(Side::Sell, "ETH", dec!(1)));
    confirmations.cancel(first.id).unwrap();

    let pending = confirmations.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
    assert!(TradeState::Cancelled.is_terminal());
    assert!(!TradeState::Proposed.is_terminal());
}
