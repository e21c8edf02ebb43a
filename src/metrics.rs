//! Prometheus metrics for latency tracking and monitoring.
//!
//! This module provides metrics for:
//! - Odds provider request latency
//! - End-to-end scan latency
//! - Fetch, scan and opportunity counters

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Odds provider request latency metric name.
pub const METRIC_ODDS_FETCH_LATENCY: &str = "odds_fetch_latency_ms";
/// Scan latency metric name.
pub const METRIC_SCAN_LATENCY: &str = "scan_latency_ms";
/// Odds fetches counter metric name.
pub const METRIC_ODDS_FETCHES: &str = "odds_fetches_total";
/// Failed odds fetches counter metric name.
pub const METRIC_ODDS_FETCH_FAILURES: &str = "odds_fetch_failures_total";
/// Opportunities detected counter metric name.
pub const METRIC_OPPORTUNITIES_DETECTED: &str = "opportunities_detected_total";
/// Scan requests counter metric name.
pub const METRIC_SCAN_REQUESTS: &str = "scan_requests_total";
/// Failed scans counter metric name.
pub const METRIC_SCAN_FAILURES: &str = "scan_failures_total";

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_ODDS_FETCH_LATENCY,
        "Odds provider request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_SCAN_LATENCY,
        "End-to-end arbitrage scan latency in milliseconds"
    );

    describe_counter!(
        METRIC_ODDS_FETCHES,
        "Total number of (sport, market) odds fetches settled"
    );
    describe_counter!(
        METRIC_ODDS_FETCH_FAILURES,
        "Total number of odds fetches that failed or timed out"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_DETECTED,
        "Total number of arbitrage opportunities detected"
    );
    describe_counter!(METRIC_SCAN_REQUESTS, "Total number of scans started");
    describe_counter!(
        METRIC_SCAN_FAILURES,
        "Total number of scans aborted by a provider failure"
    );

    debug!("Metrics initialized");
}

/// Record odds provider request latency.
pub fn record_odds_fetch_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_ODDS_FETCH_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment odds fetches counter.
pub fn inc_odds_fetches() {
    counter!(METRIC_ODDS_FETCHES).increment(1);
}

/// Increment failed odds fetches counter.
pub fn inc_odds_fetch_failures() {
    counter!(METRIC_ODDS_FETCH_FAILURES).increment(1);
}

/// Increment opportunities detected counter.
pub fn inc_opportunities_detected() {
    counter!(METRIC_OPPORTUNITIES_DETECTED).increment(1);
}

/// Increment scan requests counter.
pub fn inc_scan_requests() {
    counter!(METRIC_SCAN_REQUESTS).increment(1);
}

/// Increment failed scans counter.
pub fn inc_scan_failures() {
    counter!(METRIC_SCAN_FAILURES).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a full scan.
pub fn timer_scan() -> LatencyTimer {
    LatencyTimer::new(METRIC_SCAN_LATENCY)
}
