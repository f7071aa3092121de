//! Configuration for the assistant and its text-generation collaborator

use std::env;
use std::time::Duration;

use common::error::CredentialPresence;
use secrecy::SecretString;

/// Default text-generation API base URL
pub const DEFAULT_CHAT_API_BASE: &str = "https://api.anthropic.com";

/// Default model identifier
pub const DEFAULT_CHAT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default timeout for a single completion call
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;

/// Name reported in credential diagnostics
pub const CHAT_SERVICE: &str = "Anthropic";

/// Configuration for the text-generation client
#[derive(Debug)]
pub struct ChatConfig {
    /// API base URL (no trailing slash)
    pub api_base: String,
    /// API key
    pub api_key: Option<SecretString>,
    /// Model identifier sent with every request
    pub model: String,
    /// Completion budget sent with every request
    pub max_tokens: u32,
    /// Timeout applied to every call
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: env::var("ANTHROPIC_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_CHAT_API_BASE.to_string()),
            api_key: env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from),
            model: env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            max_tokens: env::var("ANTHROPIC_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
        }
    }
}

impl ChatConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a new configuration with custom values
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from),
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
        }
    }

    /// Which credentials are present, for diagnostics
    pub fn presence(&self) -> CredentialPresence {
        CredentialPresence {
            has_key: self.api_key.is_some(),
            has_secret: None,
        }
    }
}

/// Default time an unused session is kept
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Default number of sessions kept open at once
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Configuration for sessions and the confirmation workflow
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// How long a proposal stays confirmable; `None` means no expiry
    pub proposal_ttl: Option<Duration>,
    /// Sessions unused for this long are closed
    pub session_idle_ttl: Duration,
    /// Open sessions beyond this count close the least recently used one
    pub max_sessions: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            proposal_ttl: None,
            session_idle_ttl: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl AssistantConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self {
            proposal_ttl: positive_env("TRADE_PROPOSAL_TTL_SECS").map(Duration::from_secs),
            session_idle_ttl: Duration::from_secs(
                positive_env("SESSION_IDLE_TTL_SECS").unwrap_or(DEFAULT_SESSION_IDLE_SECS),
            ),
            max_sessions: positive_env("MAX_SESSIONS")
                .map(|max| max as usize)
                .unwrap_or(DEFAULT_MAX_SESSIONS),
        }
    }

    /// Create a new configuration with custom values
    pub fn new(proposal_ttl: Option<Duration>) -> Self {
        Self {
            proposal_ttl,
            ..Self::default()
        }
    }

    /// Override the session limits
    pub fn with_session_limits(mut self, idle_ttl: Duration, max_sessions: usize) -> Self {
        self.session_idle_ttl = idle_ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }
}

fn positive_env(name: &str) -> Option<u64> {
    env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|value| *value > 0)
}
