//! HTTP API handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::arbitrage::{scan, ScanRequest};
use crate::config::Config;
use crate::error::ScanError;
use crate::odds::OddsSource;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where odds come from.
    pub source: Arc<dyn OddsSource>,
    /// Loaded configuration (scan defaults, fallback key).
    pub config: Arc<Config>,
    /// Whether the service is ready to serve scans.
    pub ready: Arc<AtomicBool>,
    /// Prometheus handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state. Starts not ready.
    pub fn new(source: Arc<dyn OddsSource>, config: Config) -> Self {
        Self {
            source,
            config: Arc::new(config),
            ready: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Query parameters of `GET /api/arbitrage`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageQuery {
    /// Provider API key.
    pub api_key: Option<String>,
    /// Bookmaker region.
    pub region: Option<String>,
    /// Minimum profit in percent.
    pub cutoff: Option<String>,
    /// Comma-separated market keys.
    pub markets: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
    /// Name of the configured odds source.
    pub source: String,
}

/// Error body returned to API callers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(ErrorResponse {
                message: self.public_message(),
            }),
        )
            .into_response()
    }
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let response = ReadyResponse {
        ready: is_ready,
        source: state.source.name().to_string(),
    };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Arbitrage scan handler - returns opportunities sorted by profit.
pub async fn arbitrage(
    State(state): State<AppState>,
    Query(query): Query<ArbitrageQuery>,
) -> Result<Response, ScanError> {
    let request = ScanRequest::resolve(
        query.api_key.as_deref(),
        query.region.as_deref(),
        query.cutoff.as_deref(),
        query.markets.as_deref(),
        &state.config,
    )
    .map_err(|e| {
        warn!(error = %e, "Rejected arbitrage request");
        e
    })?;

    let opportunities = scan(state.source.as_ref(), &request).await?;
    info!(count = opportunities.len(), "Returning arbitrage opportunities");

    Ok(Json(opportunities).into_response())
}

/// Prometheus metrics handler - 404 when the recorder is not installed.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
