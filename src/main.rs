use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pfe_api::config;
use pfe_api::database::DatabaseManager;
use pfe_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    config.validate()?;
    tracing::info!("Starting PFE API in {:?} mode", config.environment);
    if !is_production!() && !config.security.verify_token_at_edge {
        tracing::warn!("Session tokens are decoded without verification at the edge");
    }

    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("PFE API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(db.clone(), config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
