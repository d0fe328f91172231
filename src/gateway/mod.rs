//! HTTP gateway
//!
//! | Method | Path                      | Handler                        |
//! |--------|---------------------------|--------------------------------|
//! | POST   | `/cartoes`                | [`handlers::create_card`]      |
//! | GET    | `/cartoes/{numeroCartao}` | [`handlers::get_balance`]      |
//! | POST   | `/transacoes`             | [`handlers::submit_transaction`] |
//! | GET    | `/api/v1/health`          | [`handlers::health_check`]     |
//! | GET    | `/docs`                   | Swagger UI                     |

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use state::AppState;

/// Build the full router, docs included
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/cartoes", post(handlers::create_card))
        .route("/cartoes/{numeroCartao}", get(handlers::get_balance))
        .route("/transacoes", post(handlers::submit_transaction))
        .route("/api/v1/health", get(handlers::health_check))
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Serve until Ctrl+C
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let registry = state.registry_name;
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port already in use?)", addr))?;

    tracing::info!(%addr, registry, "Gateway listening");
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Gateway shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
