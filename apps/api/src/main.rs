//! # Balcão API
//!
//! HTTP server for the Balcão back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Server                                    │
//! │                                                                         │
//! │  Clients ───► HTTP (3333) ───► Route handlers ───► balcao-db ──► SQLite│
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                        Reconciliation sweep (interval task)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use balcao_db::{Database, DbConfig, TaxIdCipher};

use crate::config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Balcão API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );
    if config.encryption_key_is_default {
        warn!("ENCRYPTION_KEY not set - using the development key. Set it in production.");
    }

    // Connect to the database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Connected to SQLite");

    // Tax-ID cipher
    let cipher = TaxIdCipher::from_hex(&config.encryption_key)?;

    let state = AppState {
        db: db.clone(),
        cipher,
    };

    // Periodic reconciliation sweep: catches customers whose receivables
    // silently crossed their due date with no settle/cancel action since.
    if config.sweep_interval_secs > 0 {
        let sweep_db = db.clone();
        let interval_secs = config.sweep_interval_secs;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            // The first tick fires immediately, reconciling state left over
            // from downtime.
            loop {
                ticker.tick().await;
                if let Err(e) = sweep_db.reconciliation().reconcile_all().await {
                    tracing::error!("Reconciliation sweep failed: {}", e);
                }
            }
        });
        info!(interval_secs, "Reconciliation sweep scheduled");
    } else {
        warn!("Reconciliation sweep disabled (SWEEP_INTERVAL_SECS=0); customer status may go stale until the next receivable action");
    }

    // Build and serve the router
    let app = routes::router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
