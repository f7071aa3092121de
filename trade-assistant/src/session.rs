//! Assistant session: transcript, proposals and the replies shown to the user

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use brokerage_client::Brokerage;
use chrono::{DateTime, Utc};
use common::error::{Error, Result};
use common::model::account::PortfolioSnapshot;
use common::model::order::OrderResult;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::chat::{assistant_text, ChatModel, ChatRequest};
use crate::confirmation::{ProposedTrade, TradeConfirmations};
use crate::intent::parse_reply;
use crate::prompt::{build_system_prompt, group_thousands};
use crate::transcript::{ChatTurn, Conversation};

/// Reply used when the text-generation call fails
pub const UNREACHABLE_MESSAGE: &str =
    "Could not reach the server. Please check your deployment and environment variables.";

/// Reply used when a completion carries no text
pub const EMPTY_COMPLETION_MESSAGE: &str = "I encountered an error. Please try again.";

/// Reply used when an order could not be placed
pub const TRADE_FAILED_MESSAGE: &str =
    "**Trade could not be executed.** Please check your Coinbase API permissions and try again.";

/// Reply used when a proposal was already resolved or never existed
pub const NOT_PENDING_MESSAGE: &str =
    "That trade is no longer pending. Ask me for a fresh proposal if you still want to trade.";

/// Reply used when a proposal outlived its confirmation window
pub const EXPIRED_MESSAGE: &str =
    "That trade proposal has expired because its price may be stale. Ask me for a fresh proposal if you still want to trade.";

/// Reply used after a cancellation
pub const CANCELLED_MESSAGE: &str =
    "Trade cancelled. Your portfolio is unchanged. Let me know if you would like to explore other opportunities.";

/// Visual emphasis of a suggestion chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChipVariant {
    Buy,
    Sell,
    Warn,
}

/// Suggested follow-up the user can send with one click
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Chip {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<ChipVariant>,
}

impl Chip {
    pub fn new(label: &str, variant: Option<ChipVariant>) -> Self {
        Self {
            label: label.to_string(),
            variant,
        }
    }
}

/// Assistant message as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AssistantReply {
    /// Display text (directives removed)
    pub text: String,
    /// Suggested follow-ups
    pub chips: Vec<Chip>,
    /// Trade awaiting confirmation, when the reply proposed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade: Option<ProposedTrade>,
    /// Exchange answer, when the reply reports an order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResult>,
}

impl AssistantReply {
    /// Plain text reply without chips
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chips: Vec::new(),
            trade: None,
            order: None,
        }
    }
}

/// Suggestion chips derived from the raw assistant text
pub fn suggestion_chips(raw_text: &str, has_trade: bool) -> Vec<Chip> {
    let lowered = raw_text.to_lowercase();
    let mut chips = Vec::new();

    if lowered.contains("buy") {
        chips.push(Chip::new("Show more analysis", None));
    }
    if lowered.contains("risk") {
        chips.push(Chip::new("Hedge my portfolio", Some(ChipVariant::Warn)));
    }
    if has_trade {
        chips.push(Chip::new("Confirm trade", Some(ChipVariant::Buy)));
        chips.push(Chip::new("Cancel", Some(ChipVariant::Sell)));
    }

    chips
}

/// One user's conversation with the assistant
pub struct AssistantSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    opened: Instant,
    // Milliseconds after `opened` of the last use
    last_used_ms: AtomicU64,
    conversation: Mutex<Conversation>,
    confirmations: TradeConfirmations,
}

impl AssistantSession {
    /// Create an empty session
    pub fn new(proposal_ttl: Option<Duration>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            opened: Instant::now(),
            last_used_ms: AtomicU64::new(0),
            conversation: Mutex::new(Conversation::new()),
            confirmations: TradeConfirmations::new(proposal_ttl),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record that the session was just used
    pub fn touch(&self) {
        let elapsed = self.opened.elapsed().as_millis() as u64;
        self.last_used_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    /// Time since the session was last used
    pub fn idle_for(&self) -> Duration {
        let last_used = Duration::from_millis(self.last_used_ms.load(Ordering::Relaxed));
        self.opened.elapsed().saturating_sub(last_used)
    }

    pub fn confirmations(&self) -> &TradeConfirmations {
        &self.confirmations
    }

    /// Copy of the transcript so far
    pub async fn transcript(&self) -> Vec<ChatTurn> {
        self.conversation.lock().await.turns().to_vec()
    }

    /// Handle one user message.
    ///
    /// The transcript stays locked for the whole exchange so turns from
    /// concurrent requests on the same session never interleave. A failed
    /// completion is reported as an assistant reply, not as an error.
    pub async fn send_message(
        &self,
        text: &str,
        portfolio: &PortfolioSnapshot,
        connected: bool,
        chat: &dyn ChatModel,
    ) -> Result<AssistantReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::ValidationError("message text must not be empty".to_string()));
        }

        let mut conversation = self.conversation.lock().await;
        conversation.push_user(text);

        let request = ChatRequest {
            system: Some(build_system_prompt(portfolio, connected)),
            messages: conversation.turns().to_vec(),
        };

        let response = match chat.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Session {}: completion failed: {}", self.id, e);
                return Ok(AssistantReply::text(UNREACHABLE_MESSAGE));
            }
        };

        let raw_text = assistant_text(&response).unwrap_or_else(|| {
            warn!("Session {}: completion carried no text", self.id);
            EMPTY_COMPLETION_MESSAGE.to_string()
        });
        conversation.push_assistant(raw_text.clone());
        drop(conversation);

        let parsed = parse_reply(&raw_text);
        let trade = parsed.intent.map(|intent| self.confirmations.propose(intent));

        Ok(AssistantReply {
            chips: suggestion_chips(&raw_text, trade.is_some()),
            text: parsed.display_text,
            trade,
            order: None,
        })
    }

    /// Confirm a proposal and report the outcome as an assistant reply
    pub async fn confirm_trade(&self, trade_id: Uuid, brokerage: &dyn Brokerage) -> AssistantReply {
        match self.confirmations.confirm(trade_id, brokerage).await {
            Ok(confirmed) if confirmed.result.accepted => {
                let intent = &confirmed.intent;
                let order_id = confirmed
                    .result
                    .order_id
                    .clone()
                    .unwrap_or_else(|| confirmed.client_order_id.to_string());
                info!("Session {}: trade {} placed as order {}", self.id, trade_id, order_id);

                AssistantReply {
                    text: format!(
                        "**Order submitted successfully.** Your {} order for **{} {}** at ${} has been placed on Coinbase.\n\nOrder ID: `{}`\n\nWould you like to set a stop-loss or price alert for this position?",
                        intent.side,
                        intent.amount.normalize(),
                        intent.symbol,
                        group_thousands(intent.reference_price.normalize()),
                        order_id
                    ),
                    chips: vec![
                        Chip::new("Set stop-loss", Some(ChipVariant::Warn)),
                        Chip::new("Set price alert", None),
                    ],
                    trade: None,
                    order: Some(confirmed.result),
                }
            }
            Ok(confirmed) => {
                warn!(
                    "Session {}: trade {} rejected: {:?}",
                    self.id, trade_id, confirmed.result.error_detail
                );
                AssistantReply {
                    order: Some(confirmed.result),
                    ..AssistantReply::text(TRADE_FAILED_MESSAGE)
                }
            }
            Err(Error::TradeNotPending(_)) => AssistantReply::text(NOT_PENDING_MESSAGE),
            Err(Error::TradeExpired(_)) => AssistantReply::text(EXPIRED_MESSAGE),
            Err(e) => {
                error!("Session {}: trade {} failed: {}", self.id, trade_id, e);
                AssistantReply::text(TRADE_FAILED_MESSAGE)
            }
        }
    }

    /// Cancel a proposal and report the outcome as an assistant reply
    pub fn cancel_trade(&self, trade_id: Uuid) -> AssistantReply {
        match self.confirmations.cancel(trade_id) {
            Ok(_) => AssistantReply::text(CANCELLED_MESSAGE),
            Err(_) => AssistantReply::text(NOT_PENDING_MESSAGE),
        }
    }
}
