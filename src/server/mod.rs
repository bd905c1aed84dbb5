//! HTTP service.
//!
//! This module provides:
//! - Configuration and secrets loading (`config`)
//! - Shared handler state built from configuration (`state`)
//! - Request handlers (`routes`) and error mapping (`error`)
//!
//! # Routes
//!
//! | Method | Path        | Purpose                                  |
//! |--------|-------------|------------------------------------------|
//! | POST   | `/api/chat` | answer a question                        |
//! | GET    | `/health`   | liveness plus cache/upstream diagnostics |
//! | GET    | `/`         | service metadata                         |
//! | GET    | `/test`     | probe the upstream directly              |

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

/// Build the router with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/test", get(routes::test_upstream))
        .route("/api/chat", post(routes::chat))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl+C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
