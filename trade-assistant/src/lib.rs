//! Conversational trading assistant
//!
//! Assistant replies may embed a `[TRADE: ...]` directive. This crate extracts
//! it into a typed intent, holds the intent until the user explicitly confirms
//! or cancels it, and only then submits a single order to the exchange.

pub mod chat;
pub mod config;
pub mod confirmation;
pub mod intent;
pub mod prompt;
pub mod session;
pub mod transcript;

pub use chat::{assistant_text, AnthropicChat, ChatModel, ChatRequest};
pub use config::{AssistantConfig, ChatConfig};
pub use confirmation::{ConfirmedTrade, ProposedTrade, TradeConfirmations, TradeState, RESOLVED_HISTORY};
pub use intent::{parse_reply, parse_trade_directive, strip_trade_directives, ParsedReply};
pub use prompt::{build_system_prompt, demo_portfolio};
pub use session::{suggestion_chips, AssistantReply, AssistantSession, Chip, ChipVariant};
pub use transcript::{ChatTurn, Conversation, Role};
