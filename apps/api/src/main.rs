mod config;
mod errors;
mod generation;
mod llm_client;
mod rate_limit;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::http::Method;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AiService, Config};
use crate::llm_client::build_generator;
use crate::routes::build_router;
use crate::state::AppState;

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cover Letter API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM backend
    let llm = build_generator(&config)?;
    match config.ai_service {
        AiService::Gemini => info!(
            "LLM client initialized (gemini, models: {})",
            config.gemini_models().join(", ")
        ),
        AiService::OpenAi => info!(
            "LLM client initialized (openai, model: {})",
            config.openai_model
        ),
    }
    if config.active_api_key().is_none() {
        warn!(
            "No API key configured for {}; generation requests will fail until one is set",
            config.ai_service
        );
    }

    if config.static_dir.is_dir() {
        info!("Serving static files from {}", config.static_dir.display());
    }

    // Build app state
    let state = AppState::new(config.clone(), llm);
    rate_limit::spawn_cleanup(state.rate_limiter.clone(), RATE_LIMIT_CLEANUP_INTERVAL);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");
    info!("Routes: GET /api/health, POST /api/generate, POST /api/generate-advanced");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
