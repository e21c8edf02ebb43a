//! Mock odds source for unit testing.
//!
//! This module provides a mock source that can be used in tests
//! without making real network requests, plus builders for match fixtures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use time::macros::datetime;
use time::OffsetDateTime;

use super::source::OddsSource;
use super::types::{BookmakerQuote, Market, Match, Outcome};
use crate::error::ProviderError;

/// Failure injected for a sports listing or a (sport, market) fetch.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Respond as the provider would with this status and optional message.
    Status(u16, Option<String>),
    /// Fail before any response, as a dropped connection would.
    Network,
    /// Never answer within any reasonable timeout.
    Hang,
}

impl MockFailure {
    async fn into_error(self) -> ProviderError {
        match self {
            MockFailure::Status(status, message) => ProviderError::from_status(status, message),
            MockFailure::Network => ProviderError::Network("mock connection reset".to_string()),
            MockFailure::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                ProviderError::Network("mock hang elapsed".to_string())
            }
        }
    }
}

type PairKey = (String, String);

/// Mock odds source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockOddsSource {
    /// Active sport keys, in listing order.
    sports: Arc<Mutex<Vec<String>>>,
    /// Matches returned per (sport, market).
    odds: Arc<Mutex<HashMap<PairKey, Vec<Match>>>>,
    /// Failures injected per (sport, market).
    failures: Arc<Mutex<HashMap<PairKey, MockFailure>>>,
    /// Failure injected into the sports listing.
    sports_failure: Arc<Mutex<Option<MockFailure>>>,
    /// Number of provider calls made.
    calls: Arc<AtomicUsize>,
}

impl MockOddsSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active sport.
    pub fn add_sport(&self, sport_key: impl Into<String>) -> &Self {
        self.sports.lock().unwrap().push(sport_key.into());
        self
    }

    /// Set the matches returned for a (sport, market) pair.
    pub fn set_odds(
        &self,
        sport_key: impl Into<String>,
        market_key: impl Into<String>,
        matches: Vec<Match>,
    ) -> &Self {
        self.odds
            .lock()
            .unwrap()
            .insert((sport_key.into(), market_key.into()), matches);
        self
    }

    /// Make the fetch for a (sport, market) pair fail.
    pub fn fail_odds(
        &self,
        sport_key: impl Into<String>,
        market_key: impl Into<String>,
        failure: MockFailure,
    ) -> &Self {
        self.failures
            .lock()
            .unwrap()
            .insert((sport_key.into(), market_key.into()), failure);
        self
    }

    /// Make the sports listing fail.
    pub fn fail_sports(&self, failure: MockFailure) -> &Self {
        *self.sports_failure.lock().unwrap() = Some(failure);
        self
    }

    /// Number of calls made against this source.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OddsSource for MockOddsSource {
    async fn list_active_sports(&self, _api_key: &str) -> Result<Vec<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failure = self.sports_failure.lock().unwrap().clone();
        if let Some(failure) = failure {
            return Err(failure.into_error().await);
        }

        Ok(self.sports.lock().unwrap().clone())
    }

    async fn fetch_odds(
        &self,
        _api_key: &str,
        sport_key: &str,
        _region: &str,
        markets: &[String],
    ) -> Result<Vec<Match>, ProviderError> {
        if markets.is_empty() {
            return Ok(Vec::new());
        }
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut matches = Vec::new();
        for market in markets {
            let key = (sport_key.to_string(), market.clone());

            let failure = self.failures.lock().unwrap().get(&key).cloned();
            if let Some(failure) = failure {
                return Err(failure.into_error().await);
            }

            if let Some(found) = self.odds.lock().unwrap().get(&key) {
                matches.extend(found.iter().cloned());
            }
        }

        Ok(matches)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Build an outcome without a line.
pub fn outcome(name: &str, price: Decimal) -> Outcome {
    Outcome {
        name: name.to_string(),
        price: Some(price),
        point: None,
        description: None,
    }
}

/// Build an outcome on a line (over/under, spreads).
pub fn lined_outcome(name: &str, price: Decimal, point: Decimal) -> Outcome {
    Outcome {
        name: name.to_string(),
        price: Some(price),
        point: Some(point),
        description: None,
    }
}

/// Builder for match fixtures.
#[derive(Debug, Clone)]
pub struct MatchBuilder {
    id: String,
    sport_key: String,
    sport_title: String,
    commence_time: OffsetDateTime,
    home_team: String,
    away_team: String,
    bookmakers: Vec<BookmakerQuote>,
}

impl MatchBuilder {
    /// Create a builder with placeholder teams and a fixed start time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sport_key: "soccer_epl".to_string(),
            sport_title: "EPL".to_string(),
            commence_time: datetime!(2025-03-01 15:00 UTC),
            home_team: "Home".to_string(),
            away_team: "Away".to_string(),
            bookmakers: Vec::new(),
        }
    }

    /// Set the teams.
    pub fn teams(mut self, home: &str, away: &str) -> Self {
        self.home_team = home.to_string();
        self.away_team = away.to_string();
        self
    }

    /// Set the sport key and league title.
    pub fn sport(mut self, key: &str, title: &str) -> Self {
        self.sport_key = key.to_string();
        self.sport_title = title.to_string();
        self
    }

    /// Set the start time.
    pub fn commence_time(mut self, at: OffsetDateTime) -> Self {
        self.commence_time = at;
        self
    }

    /// Add a market quoted by a bookmaker, creating the bookmaker on first use.
    pub fn quote(mut self, bookmaker: &str, market_key: &str, outcomes: Vec<Outcome>) -> Self {
        let market = Market {
            key: market_key.to_string(),
            last_update: None,
            outcomes,
        };

        match self.bookmakers.iter_mut().find(|b| b.title == bookmaker) {
            Some(existing) => existing.markets.push(market),
            None => self.bookmakers.push(BookmakerQuote {
                key: bookmaker.to_lowercase().replace(' ', "_"),
                title: bookmaker.to_string(),
                last_update: None,
                markets: vec![market],
            }),
        }
        self
    }

    /// Build the match.
    pub fn build(self) -> Match {
        Match {
            id: self.id,
            sport_key: self.sport_key,
            sport_title: self.sport_title,
            commence_time: self.commence_time,
            home_team: Some(self.home_team),
            away_team: Some(self.away_team),
            bookmakers: self.bookmakers,
        }
    }
}
