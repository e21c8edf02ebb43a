//! Application configuration loaded from environment variables.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Odds Provider ===
    /// Fallback API key used when a request does not carry one.
    #[serde(default)]
    pub odds_api_key: Option<String>,

    /// Odds provider base URL.
    #[serde(default = "default_odds_api_url")]
    pub odds_api_url: String,

    // === Scan Defaults ===
    /// Bookmaker region when the request omits one.
    #[serde(default = "default_region")]
    pub default_region: String,

    /// Comma-separated market keys when the request omits them.
    #[serde(default = "default_markets")]
    pub default_markets: String,

    /// Profit cutoff in percent when the request omits one.
    #[serde(default)]
    pub default_cutoff_pct: Decimal,

    /// Normalized total stake spread across the outcomes.
    #[serde(default = "default_total_stake")]
    pub total_stake: Decimal,

    // === HTTP Client ===
    /// Overall reqwest client timeout.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Idle connections kept per host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    /// Timeout for a single (sport, market) odds fetch.
    #[serde(default = "default_fetch_timeout_ms")]
    pub odds_fetch_timeout_ms: u64,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Install the Prometheus recorder and expose `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_odds_api_url() -> String {
    "https://api.the-odds-api.com".to_string()
}

fn default_region() -> String {
    "eu".to_string()
}

fn default_markets() -> String {
    "h2h".to_string()
}

fn default_total_stake() -> Decimal {
    Decimal::ONE_HUNDRED
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_http_pool_size() -> usize {
    10
}

fn default_fetch_timeout_ms() -> u64 {
    8_000
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            odds_api_key: None,
            odds_api_url: default_odds_api_url(),
            default_region: default_region(),
            default_markets: default_markets(),
            default_cutoff_pct: Decimal::ZERO,
            total_stake: default_total_stake(),
            http_timeout_ms: default_http_timeout_ms(),
            http_pool_size: default_http_pool_size(),
            odds_fetch_timeout_ms: default_fetch_timeout_ms(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            metrics_enabled: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.odds_api_url.trim().is_empty() {
            return Err("ODDS_API_URL must not be empty".to_string());
        }

        if url::Url::parse(&self.odds_api_url).is_err() {
            return Err(format!("ODDS_API_URL is not a valid URL: {}", self.odds_api_url));
        }

        if self.total_stake <= Decimal::ZERO {
            return Err("TOTAL_STAKE must be positive".to_string());
        }

        if self.default_cutoff_pct < Decimal::ZERO
            || self.default_cutoff_pct >= Decimal::ONE_HUNDRED
        {
            return Err("DEFAULT_CUTOFF_PCT must be in [0, 100)".to_string());
        }

        if self.http_timeout_ms == 0 || self.odds_fetch_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS and ODDS_FETCH_TIMEOUT_MS must be non-zero".to_string());
        }

        if self.default_market_list().is_empty() {
            return Err("DEFAULT_MARKETS must name at least one market".to_string());
        }

        Ok(())
    }

    /// Default market keys, trimmed and de-duplicated.
    pub fn default_market_list(&self) -> Vec<String> {
        parse_market_list(&self.default_markets)
    }

    /// Configured API key, if it is non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.odds_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Per-fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.odds_fetch_timeout_ms)
    }

    /// Client-wide HTTP timeout as a [`Duration`].
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

/// Split a comma-separated market list, dropping blanks and duplicates while
/// keeping first-seen order.
pub fn parse_market_list(raw: &str) -> Vec<String> {
    let mut markets: Vec<String> = Vec::new();
    for key in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !markets.iter().any(|m| m == key) {
            markets.push(key.to_string());
        }
    }
    markets
}
