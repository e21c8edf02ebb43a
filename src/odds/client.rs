//! Odds provider HTTP client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use url::Url;

use super::source::OddsSource;
use super::types::{Match, ProviderErrorBody, Sport};
use crate::config::Config;
use crate::error::{AppError, ProviderError};
use crate::metrics;

/// Client for the odds provider's v4 REST API.
#[derive(Debug, Clone)]
pub struct OddsApiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Provider base URL.
    base_url: Url,
}

impl OddsApiClient {
    /// Create a new client from config.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(Duration::from_secs(3))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("odds-arb/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(&config.odds_api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::InvalidConfig(format!(
                "ODDS_API_URL cannot be used as a base: {}",
                config.odds_api_url
            )));
        }

        Ok(Self { http, base_url })
    }

    /// Get the provider base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments under the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// List all sports, active or not.
    #[instrument(skip(self, api_key))]
    pub async fn list_sports(&self, api_key: &str) -> Result<Vec<Sport>, ProviderError> {
        let url = self.endpoint(&["v4", "sports"])?;
        let start = Instant::now();

        let response = self
            .http
            .get(url)
            .query(&[("apiKey", api_key)])
            .send()
            .await;
        metrics::record_odds_fetch_latency(start, "sports");

        let response = response?;
        if !response.status().is_success() {
            return Err(classify_failure(response).await);
        }

        let sports: Vec<Sport> = response.json().await?;
        debug!(count = sports.len(), "Listed sports");
        Ok(sports)
    }
}

#[async_trait]
impl OddsSource for OddsApiClient {
    async fn list_active_sports(&self, api_key: &str) -> Result<Vec<String>, ProviderError> {
        let sports = self.list_sports(api_key).await?;
        Ok(sports
            .into_iter()
            .filter(|s| s.active)
            .map(|s| s.key)
            .collect())
    }

    #[instrument(skip(self, api_key), fields(sport = %sport_key))]
    async fn fetch_odds(
        &self,
        api_key: &str,
        sport_key: &str,
        region: &str,
        markets: &[String],
    ) -> Result<Vec<Match>, ProviderError> {
        if markets.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint(&["v4", "sports", sport_key, "odds"])?;
        let market_param = markets.join(",");
        let start = Instant::now();

        let response = self
            .http
            .get(url)
            .query(&[
                ("apiKey", api_key),
                ("regions", region),
                ("markets", market_param.as_str()),
                ("oddsFormat", "decimal"),
            ])
            .send()
            .await;
        metrics::record_odds_fetch_latency(start, "odds");

        let response = response?;
        if !response.status().is_success() {
            return Err(classify_failure(response).await);
        }

        if let Some(remaining) = response
            .headers()
            .get("x-requests-remaining")
            .and_then(|v| v.to_str().ok())
        {
            debug!(remaining = %remaining, "Provider quota");
        }

        let matches: Vec<Match> = response.json().await?;
        debug!(count = matches.len(), markets = %market_param, "Fetched odds");
        Ok(matches)
    }

    fn name(&self) -> &str {
        "the-odds-api"
    }
}

/// Turn a non-success response into a classified [`ProviderError`], using the
/// provider's JSON error body when it parses.
async fn classify_failure(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(&body);

    let err = ProviderError::from_status(status, message);
    warn!(status, error = %err, "Odds provider request failed");
    err
}

/// Best-effort extraction of `message` from a provider error body.
fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
