// Server mode - HTTP endpoint for collector-configuration submissions
//
// Assembles the submission handler behind an axum router:
// - POST /v1/config accepts a collector configuration document
// - /health and /ready for orchestration probes
// - Structured logging with tracing, optional OTLP span export
// - Graceful shutdown on Ctrl+C / SIGTERM

use anyhow::{Context as _, Result};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use otelbuild_handlers::CreateConfig;
use serde_json::json;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod audit;
pub mod config;
mod init;

use audit::PayloadAudit;
use config::ServerConfig;
use init::{init_tracer_provider, init_tracing};

/// POST /v1/config - collector configuration submission
///
/// Routed with `any()` on purpose: the submission handler owns the method
/// check and its 405 response body, so the router must not pre-filter.
async fn submit_config(
    State(handler): State<Arc<CreateConfig>>,
    req: Request<Body>,
) -> Response {
    handler.handle(req).await
}

/// GET /health - Basic health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

/// GET /ready - Readiness check
async fn ready_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ready"})))
}

fn router(handler: Arc<CreateConfig>) -> Router {
    Router::new()
        .route("/v1/config", any(submit_config))
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

/// Entry point for server mode
pub async fn run(config: ServerConfig) -> Result<()> {
    init_tracing(&config);
    let provider = init_tracer_provider(&config)?;

    let handler = Arc::new(
        CreateConfig::builder()
            .with_processors(vec![Arc::new(PayloadAudit)])
            .build(),
    );

    let app = router(handler);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .context(format!("Failed to bind to {}", config.listen_addr))?;

    info!(
        "Configuration endpoint listening on http://{}",
        config.listen_addr
    );
    info!("Routes:");
    info!(
        "  POST http://{}/v1/config - collector configuration submission",
        config.listen_addr
    );
    info!("  GET  http://{}/health    - health check", config.listen_addr);
    info!("  GET  http://{}/ready     - readiness check", config.listen_addr);
    info!("Press Ctrl+C or send SIGTERM to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(provider) = provider {
        if let Err(err) = provider.shutdown() {
            warn!("Failed to flush tracer provider: {err:?}");
        }
    }

    info!("Server shutdown complete");

    Ok(())
}
