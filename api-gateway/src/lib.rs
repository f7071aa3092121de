//! HTTP surface of the trading desk
//!
//! Serves the dashboard endpoints (market, portfolio, trade, chat) and the
//! assistant session workflow under `/api`, plus the OpenAPI document.

pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use brokerage_client::Brokerage;
use common::error::{Error, Result};
use dashmap::DashMap;
use portfolio_service::{PortfolioService, PortfolioServiceConfig};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use trade_assistant::{AssistantConfig, AssistantSession, ChatModel};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::config::{AppConfig, ANY_ORIGIN};
use crate::error::ApiError;

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        api::market::get_market,
        api::portfolio::get_portfolio,
        api::trade::place_trade,
        api::chat::post_chat,
        api::session::create_session,
        api::session::post_message,
        api::session::confirm_trade,
        api::session::cancel_trade,
        api::health::health,
    ),
    components(
        schemas(
            api::market::MarketEntry,
            api::market::MarketResponse,
            api::portfolio::PortfolioEntry,
            api::portfolio::PortfolioResponse,
            api::trade::TradeRequest,
            api::trade::TradeResponse,
            api::session::SessionCreated,
            api::session::MessageRequest,
            api::health::Health,
            trade_assistant::ChatRequest,
            trade_assistant::ChatTurn,
            trade_assistant::Role,
            trade_assistant::AssistantReply,
            trade_assistant::Chip,
            trade_assistant::ChipVariant,
            trade_assistant::ProposedTrade,
            common::model::trade::TradeIntent,
            common::model::order::Side,
            common::model::order::OrderResult,
            error::ErrorResponse,
            error::ErrorInfo,
        )
    ),
    tags(
        (name = "market", description = "Market overview"),
        (name = "portfolio", description = "Portfolio valuation"),
        (name = "trade", description = "Direct order placement"),
        (name = "chat", description = "Text-generation passthrough"),
        (name = "session", description = "Assistant conversations and trade confirmation"),
        (name = "health", description = "Liveness")
    ),
    info(
        title = "Nexus Trading Desk API",
        version = "1.0.0",
        description = "Portfolio, market data and assistant-driven trading on top of a brokerage account"
    )
)]
pub struct ApiDoc;

/// App state shared across handlers
pub struct AppState {
    /// Exchange access used for order placement
    pub brokerage: Arc<dyn Brokerage>,
    /// Market overview and valuation
    pub portfolio: PortfolioService,
    /// Text-generation collaborator
    pub chat: Arc<dyn ChatModel>,
    /// Open assistant sessions
    pub sessions: DashMap<Uuid, Arc<AssistantSession>>,
    /// Proposal handling settings applied to new sessions
    pub assistant: AssistantConfig,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create the shared state
    pub fn new(
        brokerage: Arc<dyn Brokerage>,
        chat: Arc<dyn ChatModel>,
        portfolio_config: &PortfolioServiceConfig,
        assistant: AssistantConfig,
    ) -> Self {
        Self {
            portfolio: PortfolioService::new(brokerage.clone(), portfolio_config),
            brokerage,
            chat,
            sessions: DashMap::new(),
            assistant,
            started_at: Instant::now(),
        }
    }

    /// Open a new assistant session and register it.
    ///
    /// Idle sessions are closed first; when the limit is still reached the
    /// least recently used session makes room.
    pub fn open_session(&self) -> Arc<AssistantSession> {
        self.evict_sessions();

        let session = Arc::new(AssistantSession::new(self.assistant.proposal_ttl));
        self.sessions.insert(session.id(), session.clone());
        session
    }

    /// Look up an open session and mark it used
    pub fn session(&self, id: Uuid) -> std::result::Result<Arc<AssistantSession>, ApiError> {
        let session = self.sessions.get(&id).map(|entry| entry.value().clone());

        match session {
            Some(session) if session.idle_for() < self.assistant.session_idle_ttl => {
                session.touch();
                Ok(session)
            }
            Some(_) => {
                self.sessions.remove(&id);
                info!("Closed idle assistant session {}", id);
                Err(Error::SessionNotFound(id.to_string()).into())
            }
            None => Err(Error::SessionNotFound(id.to_string()).into()),
        }
    }

    fn evict_sessions(&self) {
        let idle_ttl = self.assistant.session_idle_ttl;
        self.sessions.retain(|id, session| {
            let open = session.idle_for() < idle_ttl;
            if !open {
                info!("Closed idle assistant session {}", id);
            }
            open
        });

        let max_sessions = self.assistant.max_sessions.max(1);
        while self.sessions.len() >= max_sessions {
            let least_recent = self
                .sessions
                .iter()
                .max_by_key(|entry| entry.value().idle_for())
                .map(|entry| *entry.key());

            match least_recent {
                Some(id) => {
                    self.sessions.remove(&id);
                    info!("Closed assistant session {} to stay within {} sessions", id, max_sessions);
                }
                None => break,
            }
        }
    }
}

/// CORS policy for the configured origin
pub fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    let origin = if allowed_origin.trim() == ANY_ORIGIN {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(allowed_origin.trim()).map_err(|_| {
            Error::ConfigurationError(format!("invalid ALLOWED_ORIGIN: {}", allowed_origin))
        })?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Route that also answers `OPTIONS` and rejects every other method with a JSON 405.
///
/// `HEAD` is rejected explicitly: axum would otherwise run the `GET` handler for it.
fn resource(route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    route
        .options(api::preflight)
        .head(api::method_not_allowed)
        .fallback(api::method_not_allowed)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router
pub fn router(state: Arc<AppState>, config: &AppConfig) -> Result<Router> {
    let api_routes = Router::new()
        // Dashboard routes
        .route("/market", resource(get(api::market::get_market)))
        .route("/portfolio", resource(get(api::portfolio::get_portfolio)))
        .route("/trade", resource(post(api::trade::place_trade)))
        .route("/chat", resource(post(api::chat::post_chat)))

        // Session routes
        .route("/sessions", resource(post(api::session::create_session)))
        .route("/sessions/:id/messages", resource(post(api::session::post_message)))
        .route(
            "/sessions/:id/trades/:trade_id/confirm",
            resource(post(api::session::confirm_trade)),
        )
        .route(
            "/sessions/:id/trades/:trade_id/cancel",
            resource(post(api::session::cancel_trade)),
        )

        .route("/health", resource(get(api::health::health)));

    Ok(Router::new()
        .nest("/api", api_routes)
        .route("/api-docs/openapi.json", get(openapi))
        .fallback(api::not_found)
        .layer(cors_layer(&config.allowed_origin)?)
        .with_state(state))
}
