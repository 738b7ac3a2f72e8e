//! Patron Gate server entry point

use anyhow::{Context, Result};
use patron_gate::adapters::http::{gateway_router, with_http_layers};
use patron_gate::bootstrap::{build_app_state, init_tracing};
use patron_gate::config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.server);
    config.validate().context("Invalid configuration")?;

    let state = build_app_state(&config)
        .await
        .context("Failed to initialize gateway")?;
    let app = with_http_layers(gateway_router(state), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        addr = %addr,
        environment = ?config.server.environment,
        public_url = %config.server.public_base(),
        "Patron Gate listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
