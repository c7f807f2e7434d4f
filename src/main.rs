//! RateHub service entry point

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ratehub::config::AppConfig;
use ratehub::engine::RateEngine;
use ratehub::providers;
use ratehub::server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    info!("Configuration loaded: {}", config.digest());

    let registry = Arc::new(providers::build_registry(&config));
    if registry.is_empty() {
        warn!("no provider credentials configured; every fetch will fail until one is set");
    } else {
        info!("{} provider(s) enabled", registry.len());
    }

    let engine = Arc::new(RateEngine::new(
        registry,
        config.cache.ttl_secs,
        config.engine.freshness_threshold_secs,
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, server::create_router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received, stopping server");
}
