//! Concurrent odds acquisition across every (sport, market) pair.

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::source::OddsSource;
use super::types::Match;
use crate::error::ProviderError;
use crate::metrics;

/// Outcome of one acquisition pass.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionReport {
    /// Matches from every fetch that succeeded, in launch order.
    pub matches: Vec<Match>,
    /// Number of (sport, market) fetches launched.
    pub pairs_attempted: usize,
    /// Fetches that failed or timed out.
    pub failures: Vec<FetchFailure>,
}

impl AcquisitionReport {
    /// Number of fetches that settled successfully.
    pub fn pairs_succeeded(&self) -> usize {
        self.pairs_attempted - self.failures.len()
    }
}

/// A (sport, market) fetch that did not contribute data.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// Sport key.
    pub sport_key: String,
    /// Market key.
    pub market_key: String,
    /// Why it failed.
    pub error: ProviderError,
}

/// List active sports, then fetch odds for every requested market of each.
///
/// A failure listing sports aborts the pass. Failures of individual
/// (sport, market) fetches are logged and left out of the report's matches.
#[instrument(skip(source, api_key, markets), fields(source = source.name(), markets = markets.len()))]
pub async fn acquire_odds(
    source: &dyn OddsSource,
    api_key: &str,
    region: &str,
    markets: &[String],
    fetch_timeout: Duration,
) -> Result<AcquisitionReport, ProviderError> {
    let sports = source.list_active_sports(api_key).await?;
    info!(sports = sports.len(), "Active sports listed");

    Ok(fetch_all_odds(source, api_key, region, &sports, markets, fetch_timeout).await)
}

/// Fetch odds for every (sport, market) pair concurrently.
///
/// Every fetch runs to completion or timeout; none is cancelled because
/// another failed. Results are merged in launch order, so the output does not
/// depend on which fetch finishes first.
pub async fn fetch_all_odds(
    source: &dyn OddsSource,
    api_key: &str,
    region: &str,
    sports: &[String],
    markets: &[String],
    fetch_timeout: Duration,
) -> AcquisitionReport {
    let pairs: Vec<(&str, &str)> = sports
        .iter()
        .flat_map(|sport| markets.iter().map(move |market| (sport.as_str(), market.as_str())))
        .collect();

    let fetches = pairs.iter().map(|&(sport, market)| async move {
        let requested = [market.to_string()];
        let result = tokio::time::timeout(
            fetch_timeout,
            source.fetch_odds(api_key, sport, region, &requested),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ProviderError::Timeout {
                after_ms: fetch_timeout.as_millis() as u64,
            })
        });
        (sport, market, result)
    });

    let settled = join_all(fetches).await;

    let mut report = AcquisitionReport {
        pairs_attempted: pairs.len(),
        ..Default::default()
    };

    for (sport, market, result) in settled {
        metrics::inc_odds_fetches();
        match result {
            Ok(matches) => {
                debug!(sport, market, count = matches.len(), "Odds fetched");
                report.matches.extend(matches);
            }
            Err(error) => {
                warn!(sport, market, error = %error, "Odds fetch failed; skipping pair");
                metrics::inc_odds_fetch_failures();
                report.failures.push(FetchFailure {
                    sport_key: sport.to_string(),
                    market_key: market.to_string(),
                    error,
                });
            }
        }
    }

    info!(
        attempted = report.pairs_attempted,
        failed = report.failures.len(),
        matches = report.matches.len(),
        "Odds acquisition settled"
    );

    report
}
