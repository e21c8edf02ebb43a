//! HTTP API route definitions.

use axum::{body::Body, http::Request, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use super::handlers::{arbitrage, health, metrics, ready, AppState};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    // Path only: the query string carries the API key.
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        info_span!("http", method = %req.method(), path = %req.uri().path())
    });

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        // Scan endpoint
        .route("/api/arbitrage", get(arbitrage))
        .layer(trace)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
