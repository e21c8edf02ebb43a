//! One arbitrage scan: acquire odds, group markets, detect opportunities.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::calculator::ArbitrageOpportunity;
use super::detector::detect_opportunities;
use super::grouping::build_market_instances;
use crate::config::{parse_market_list, Config};
use crate::error::ScanError;
use crate::metrics;
use crate::odds::{acquire_odds, OddsSource};

/// Fully resolved parameters of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    /// Provider API key.
    pub api_key: String,
    /// Bookmaker region.
    pub region: String,
    /// Market keys to fetch for each sport.
    pub markets: Vec<String>,
    /// Minimum profit as a fraction (0.01 = 1%).
    pub cutoff: Decimal,
    /// Stake spread across each opportunity's outcomes.
    pub total_stake: Decimal,
    /// Timeout for a single (sport, market) fetch.
    pub fetch_timeout: Duration,
}

impl ScanRequest {
    /// Resolve caller-supplied parameters against configured defaults.
    ///
    /// Blank values count as absent. `cutoff_pct` is a percentage in
    /// `[0, 100)`.
    pub fn resolve(
        api_key: Option<&str>,
        region: Option<&str>,
        cutoff_pct: Option<&str>,
        markets: Option<&str>,
        config: &Config,
    ) -> Result<Self, ScanError> {
        let api_key = non_blank(api_key)
            .or_else(|| config.api_key())
            .ok_or(ScanError::MissingApiKey)?
            .to_string();

        let region = non_blank(region)
            .unwrap_or(config.default_region.as_str())
            .to_string();

        let cutoff_pct = match non_blank(cutoff_pct) {
            Some(raw) => parse_cutoff_pct(raw)?,
            None => config.default_cutoff_pct,
        };

        let markets = match non_blank(markets) {
            Some(raw) => parse_market_list(raw),
            None => config.default_market_list(),
        };
        if markets.is_empty() {
            return Err(ScanError::InvalidParameter(
                "markets must name at least one market".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            region,
            markets,
            cutoff: cutoff_pct / Decimal::ONE_HUNDRED,
            total_stake: config.total_stake,
            fetch_timeout: config.fetch_timeout(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_cutoff_pct(raw: &str) -> Result<Decimal, ScanError> {
    let cutoff = Decimal::from_str(raw)
        .map_err(|_| ScanError::InvalidParameter(format!("cutoff must be a number, got '{}'", raw)))?;

    if cutoff < Decimal::ZERO || cutoff >= Decimal::ONE_HUNDRED {
        return Err(ScanError::InvalidParameter(
            "cutoff must be between 0 and 100".to_string(),
        ));
    }

    Ok(cutoff)
}

/// Run a full scan against an odds source.
///
/// Only a failure to list active sports fails the scan; individual odds
/// fetches that fail are left out of the result.
#[instrument(skip_all, fields(region = %request.region, markets = ?request.markets))]
pub async fn scan(
    source: &dyn OddsSource,
    request: &ScanRequest,
) -> Result<Vec<ArbitrageOpportunity>, ScanError> {
    let _timer = metrics::timer_scan();
    metrics::inc_scan_requests();

    let report = acquire_odds(
        source,
        &request.api_key,
        &request.region,
        &request.markets,
        request.fetch_timeout,
    )
    .await
    .map_err(|e| {
        warn!(error = %e, "Scan aborted: could not list active sports");
        metrics::inc_scan_failures();
        ScanError::from(e)
    })?;

    let instances = build_market_instances(&report.matches);
    let opportunities = detect_opportunities(&instances, request.cutoff, request.total_stake);

    info!(
        matches = report.matches.len(),
        instances = instances.len(),
        failed_fetches = report.failures.len(),
        opportunities = opportunities.len(),
        "Scan complete"
    );

    Ok(opportunities)
}
