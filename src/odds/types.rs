//! Odds provider data types.
//!
//! Shapes follow the provider's v4 JSON: a match carries bookmaker quotes,
//! each quote carries markets, each market carries priced outcomes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A sport listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    /// Sport key used in odds requests (e.g. "soccer_epl").
    pub key: String,
    /// Sport group (e.g. "Soccer").
    #[serde(default)]
    pub group: String,
    /// Display title (e.g. "EPL").
    #[serde(default)]
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Whether the sport currently has events.
    #[serde(default)]
    pub active: bool,
    /// Whether the sport only offers outright markets.
    #[serde(default)]
    pub has_outrights: bool,
}

/// A single bettable result within a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome name (team name, "Draw", "Over", "Under").
    pub name: String,
    /// Decimal odds. Absent or `<= 1.0` prices are unusable.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Line for over/under and spread style markets.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub point: Option<Decimal>,
    /// Extra identifier, e.g. the player for player props.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Outcome {
    /// Price if it can take part in an arbitrage (strictly above 1.0).
    pub fn valid_price(&self) -> Option<Decimal> {
        self.price.filter(|p| *p > Decimal::ONE)
    }
}

/// One bookmaker's market for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Market key (e.g. "h2h", "totals", "player_points").
    pub key: String,
    /// Last time the bookmaker updated this market.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
    /// Outcomes offered.
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

impl Market {
    /// Line of the first outcome, used to tell market instances apart.
    pub fn line(&self) -> Option<Decimal> {
        self.outcomes.first().and_then(|o| o.point)
    }
}

/// One bookmaker's markets for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmakerQuote {
    /// Bookmaker key (e.g. "pinnacle").
    pub key: String,
    /// Display name (e.g. "Pinnacle").
    pub title: String,
    /// Last time any market was updated.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
    /// Markets quoted.
    #[serde(default)]
    pub markets: Vec<Market>,
}

/// A sporting event with its bookmaker quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Provider event id.
    pub id: String,
    /// Sport key.
    pub sport_key: String,
    /// Sport title, shown as the league.
    #[serde(default)]
    pub sport_title: String,
    /// Scheduled start.
    #[serde(with = "time::serde::rfc3339")]
    pub commence_time: OffsetDateTime,
    /// Home team. Null for outright events.
    #[serde(default)]
    pub home_team: Option<String>,
    /// Away team. Null for outright events.
    #[serde(default)]
    pub away_team: Option<String>,
    /// Bookmaker quotes.
    #[serde(default)]
    pub bookmakers: Vec<BookmakerQuote>,
}

impl Match {
    /// Display name, "Home vs Away", falling back to the league title.
    pub fn display_name(&self) -> String {
        match (self.home_team.as_deref(), self.away_team.as_deref()) {
            (Some(home), Some(away)) => format!("{} vs {}", home, away),
            (Some(team), None) | (None, Some(team)) => team.to_string(),
            (None, None) => self.sport_title.clone(),
        }
    }
}

/// Error body returned by the provider on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    /// Human readable message.
    pub message: Option<String>,
    /// Machine readable code.
    pub error_code: Option<String>,
}
