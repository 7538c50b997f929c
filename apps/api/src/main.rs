mod assistant;
mod config;
mod cv;
mod errors;
mod jobs;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::CliAssistant;
use crate::config::Config;
use crate::render::RenderChain;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV assistant API v{}", env!("CARGO_PKG_VERSION"));

    let assistant = Arc::new(CliAssistant::new(config.assistant_bin.clone()));
    info!(
        "Assistant runner initialized ({}, timeout {}s, CV timeout {}s)",
        config.assistant_bin, config.assistant_timeout_secs, config.cv_timeout_secs
    );

    let renderers = Arc::new(RenderChain::from_config(&config));
    if renderers.names().is_empty() {
        warn!("No PDF renderer configured, /generate-pdf will answer 501");
    } else {
        info!("PDF renderers: {}", renderers.names().join(" -> "));
    }

    let state = AppState {
        config: config.clone(),
        assistant,
        renderers,
    };

    // One semaphore shared by every route; requests run one at a time by default.
    let app = build_router(state)
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
