//! # Ledgerly API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  .env ──► AppConfig ──► Database (pool + migrations) ──► AppState      │
//! │                                                            │            │
//! │  TcpListener (HOST:PORT) ◄── axum::serve ◄── build_router ◄─┘            │
//! │        │                                                                │
//! │  Ctrl+C / SIGTERM ──► drain requests ──► db.close()                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use invoice_api::{build_router, AppConfig, AppState};
use invoice_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Ledgerly API server...");

    let config = AppConfig::load()?;
    if config.uses_dev_secret() {
        warn!("JWT_SECRET is not set; using the insecure development secret");
    }
    info!(
        addr = %config.bind_address(),
        db_url = %config.database_url,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_url).max_connections(config.database_max_connections),
    )
    .await
    .context("failed to open database")?;

    let state = Arc::new(AppState::new(db.clone(), &config));
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;

    info!(addr = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
