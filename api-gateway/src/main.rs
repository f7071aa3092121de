//! API Gateway for the trading desk

use std::sync::Arc;

use api_gateway::config::AppConfig;
use api_gateway::{router, AppState};
use brokerage_client::{Brokerage, BrokerageConfig, CoinbaseClient};
use clap::Parser;
use dotenv::dotenv;
use portfolio_service::PortfolioServiceConfig;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use trade_assistant::{AnthropicChat, AssistantConfig, ChatConfig, ChatModel};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

/// Trading desk API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address (defaults to 127.0.0.1:$PORT)
    #[clap(short, long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging with debug level when DEBUG=1 env var is set
    let env = std::env::var("DEBUG").unwrap_or_else(|_| "0".to_string());
    let log_level = if env == "1" { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse("tower_http=debug,api_gateway=debug")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Debug logging enabled");

    // Configuration is read once; credentials never leave the config structs
    let config = AppConfig::from_env();
    let brokerage_config = BrokerageConfig::from_env();
    let chat_config = ChatConfig::from_env();

    let presence = brokerage_config.presence();
    if !presence.has_key || presence.has_secret != Some(true) {
        warn!(
            "Exchange credentials incomplete (key: {}, secret: {:?}); market, portfolio and trade calls will fail",
            presence.has_key, presence.has_secret
        );
    } else {
        info!("Exchange requests signed with the {} scheme", brokerage_config.resolved_scheme());
    }
    if !chat_config.presence().has_key {
        warn!("Text-generation key missing; assistant replies will report the service as unreachable");
    }

    let brokerage: Arc<dyn Brokerage> = Arc::new(CoinbaseClient::new(&brokerage_config)?);
    let chat: Arc<dyn ChatModel> = Arc::new(AnthropicChat::new(chat_config)?);

    let assistant_config = AssistantConfig::from_env();
    info!(
        "Assistant sessions: at most {}, closed after {}s idle",
        assistant_config.max_sessions,
        assistant_config.session_idle_ttl.as_secs()
    );

    let state = Arc::new(AppState::new(
        brokerage,
        chat,
        &PortfolioServiceConfig::from_env(),
        assistant_config,
    ));

    let app = router(state, &config)?.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(log_level))
            .on_request(DefaultOnRequest::new().level(log_level))
            .on_response(DefaultOnResponse::new().level(log_level)),
    );

    // Start the server
    let addr: std::net::SocketAddr = args.addr.unwrap_or_else(|| config.default_addr()).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {} (CORS origin: {})", addr, config.allowed_origin);

    // Run until interrupt signal
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
