//! HTTP API module for the scan, health and metrics endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, ArbitrageQuery, ErrorResponse};
pub use routes::create_router;
