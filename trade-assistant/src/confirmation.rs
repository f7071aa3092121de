//! Two-step confirmation of proposed trades
//!
//! A proposal starts `Proposed` and reaches exactly one terminal state:
//! `Confirmed` (one order submitted), `Cancelled` (nothing submitted) or
//! `Expired` (confirmation window elapsed, nothing submitted). Removing the
//! entry from the pending map is the at-most-once guard: only the caller that
//! wins the removal may submit an order.
//!
//! Only the most recent [`RESOLVED_HISTORY`] outcomes are remembered; older
//! ids report no state and still cannot be confirmed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use brokerage_client::Brokerage;
use chrono::{DateTime, Utc};
use common::decimal::Amount;
use common::error::{Error, Result};
use common::model::order::{OrderRequest, OrderResult};
use common::model::trade::TradeIntent;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of resolved proposals whose outcome is kept
pub const RESOLVED_HISTORY: usize = 256;

/// Lifecycle state of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TradeState {
    Proposed,
    Confirmed,
    Cancelled,
    Expired,
}

impl TradeState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeState::Proposed)
    }
}

/// A trade awaiting user confirmation
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProposedTrade {
    /// Proposal identifier
    pub id: Uuid,
    /// What would be traded
    pub intent: TradeIntent,
    /// amount * reference price, for display; absent when it overflows
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<f64>)]
    pub estimated_total: Option<Amount>,
    /// When the proposal was registered
    pub proposed_at: DateTime<Utc>,
    /// When the proposal stops being confirmable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProposedTrade {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

/// Outcome of a confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedTrade {
    /// Proposal identifier
    pub id: Uuid,
    /// What was traded
    pub intent: TradeIntent,
    /// Client order id sent with the submission
    pub client_order_id: Uuid,
    /// Exchange answer
    pub result: OrderResult,
}

/// Registry of proposals for one conversation
pub struct TradeConfirmations {
    pending: DashMap<Uuid, ProposedTrade>,
    resolved: DashMap<Uuid, (u64, TradeState)>,
    resolutions: AtomicU64,
    ttl: Option<Duration>,
}

impl TradeConfirmations {
    /// Create a registry; proposals never expire when `ttl` is `None`
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            pending: DashMap::new(),
            resolved: DashMap::new(),
            resolutions: AtomicU64::new(0),
            ttl,
        }
    }

    /// Register an intent as a pending proposal
    pub fn propose(&self, intent: TradeIntent) -> ProposedTrade {
        let now = Utc::now();
        let expires_at = self
            .ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .map(|ttl| now + ttl);

        let proposal = ProposedTrade {
            id: Uuid::new_v4(),
            estimated_total: intent.estimated_total(),
            intent,
            proposed_at: now,
            expires_at,
        };

        info!(
            "Proposed trade {}: {} {} {}",
            proposal.id, proposal.intent.side, proposal.intent.amount, proposal.intent.symbol
        );
        self.pending.insert(proposal.id, proposal.clone());
        proposal
    }

    /// Confirm a pending proposal and submit exactly one order for it.
    ///
    /// The proposal is resolved before the order is sent, so a failed
    /// submission is not retried by confirming again.
    pub async fn confirm(&self, id: Uuid, brokerage: &dyn Brokerage) -> Result<ConfirmedTrade> {
        let (_, proposal) = self
            .pending
            .remove(&id)
            .ok_or_else(|| Error::TradeNotPending(id.to_string()))?;

        if proposal.is_expired(Utc::now()) {
            warn!("Trade {} expired before confirmation", id);
            self.resolve(id, TradeState::Expired);
            return Err(Error::TradeExpired(id.to_string()));
        }

        self.resolve(id, TradeState::Confirmed);

        let order = OrderRequest::from_intent(&proposal.intent);
        info!("Confirmed trade {} as client order {}", id, order.client_order_id);

        let result = brokerage.place_order(&order).await?;

        Ok(ConfirmedTrade {
            id,
            intent: proposal.intent,
            client_order_id: order.client_order_id,
            result,
        })
    }

    /// Cancel a pending proposal. No network call is made.
    pub fn cancel(&self, id: Uuid) -> Result<TradeIntent> {
        let (_, proposal) = self
            .pending
            .remove(&id)
            .ok_or_else(|| Error::TradeNotPending(id.to_string()))?;

        self.resolve(id, TradeState::Cancelled);
        info!("Cancelled trade {}", id);
        Ok(proposal.intent)
    }

    /// Current state of a proposal, `None` when the id was never proposed here
    pub fn state(&self, id: Uuid) -> Option<TradeState> {
        if self.pending.contains_key(&id) {
            return Some(TradeState::Proposed);
        }
        self.resolved.get(&id).map(|entry| entry.value().1)
    }

    fn resolve(&self, id: Uuid, state: TradeState) {
        let seq = self.resolutions.fetch_add(1, Ordering::Relaxed);
        self.resolved.insert(id, (seq, state));

        if self.resolved.len() > RESOLVED_HISTORY {
            let oldest = self
                .resolved
                .iter()
                .min_by_key(|entry| entry.value().0)
                .map(|entry| *entry.key());
            if let Some(oldest) = oldest {
                self.resolved.remove(&oldest);
            }
        }
    }

    /// Proposals still awaiting a decision, oldest first
    pub fn pending(&self) -> Vec<ProposedTrade> {
        let mut proposals: Vec<ProposedTrade> =
            self.pending.iter().map(|entry| entry.value().clone()).collect();
        proposals.sort_by_key(|p| p.proposed_at);
        proposals
    }
}

impl Default for TradeConfirmations {
    fn default() -> Self {
        Self::new(None)
    }
}
