//! HTTP server exposing the query surface to local clients.
//!
//! Routes:
//! - `GET /health`: liveness and version
//! - `GET /cell`: current cell report
//! - `GET /wifi`: current WiFi report (may wait for the platform on push tiers)
//! - `GET /stats`: agent counters

use crate::agent::SignalAgent;
use crate::core::{CellReport, WifiReport};
use crate::error::SignalError;
use crate::stats::StatsSnapshot;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tier: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: SignalError) -> ApiError {
    let (status, code) = match e {
        SignalError::PermissionDenied => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
        SignalError::SourceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SOURCE_UNAVAILABLE"),
        SignalError::Overwritten => (StatusCode::CONFLICT, "OVERWRITTEN"),
        SignalError::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED"),
        SignalError::SerializationFailure(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_FAILURE")
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            code: code.to_string(),
        }),
    )
}

/// GET /health
async fn health(State(agent): State<Arc<SignalAgent>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tier: format!("{:?}", agent.tier()).to_lowercase(),
    })
}

/// Platform reads block, so they run on the blocking pool.
async fn blocking<T, F>(agent: Arc<SignalAgent>, read: F) -> Result<Json<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&SignalAgent) -> crate::error::Result<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || read(&agent))
        .await
        .map_err(|e| {
            tracing::error!("query task failed: {}", e);
            api_error(SignalError::Cancelled)
        })?;
    result.map(Json).map_err(api_error)
}

/// GET /cell
async fn cell(State(agent): State<Arc<SignalAgent>>) -> Result<Json<CellReport>, ApiError> {
    blocking(agent, |a| a.get_cell_report()).await
}

/// GET /wifi
async fn wifi(State(agent): State<Arc<SignalAgent>>) -> Result<Json<WifiReport>, ApiError> {
    blocking(agent, |a| a.get_wifi_report()).await
}

/// GET /stats
async fn stats(State(agent): State<Arc<SignalAgent>>) -> Json<StatsSnapshot> {
    Json(agent.stats().snapshot())
}

/// Build the router for `agent`.
pub fn router(agent: Arc<SignalAgent>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cell", get(cell))
        .route("/wifi", get(wifi))
        .route("/stats", get(stats))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(agent)
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
    agent: Arc<SignalAgent>,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let app = router(agent);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Signal agent server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
