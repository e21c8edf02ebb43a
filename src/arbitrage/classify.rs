//! Market classification for human-readable descriptions.
//!
//! Classification never changes the arbitrage math.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::grouping::MarketInstance;

/// Market key prefixes that mark player statistics markets.
pub const PLAYER_PROP_PREFIXES: &[&str] = &["player_", "batter_", "pitcher_"];

/// Broad market category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarketType {
    /// Winner of the match.
    #[serde(rename = "h2h")]
    #[strum(serialize = "h2h")]
    H2h,
    /// Player statistic over/under or yes/no.
    PlayerProp,
    /// Totals, spreads and anything else.
    Other,
}

/// Classify a market instance from its key and outcome names.
pub fn classify_market(instance: &MarketInstance) -> MarketType {
    let key = instance.key.market_key.as_str();

    if PLAYER_PROP_PREFIXES.iter().any(|p| key.starts_with(p)) {
        return MarketType::PlayerProp;
    }

    if key == "h2h" || key == "h2h_lay" || key.starts_with("h2h_") {
        return MarketType::H2h;
    }

    let home = instance.event.home_team.as_deref();
    let away = instance.event.away_team.as_deref();
    let is_head_to_head = home.is_some()
        && instance.best_odds.keys().all(|outcome| {
            outcome.point().is_none()
                && (Some(outcome.name()) == home
                    || Some(outcome.name()) == away
                    || outcome.name().eq_ignore_ascii_case("draw"))
        });

    if is_head_to_head {
        MarketType::H2h
    } else {
        MarketType::Other
    }
}

/// Human-readable description of a market instance.
pub fn describe_market(instance: &MarketInstance, market_type: MarketType) -> String {
    let key = instance.key.market_key.as_str();
    let base = match market_type {
        MarketType::H2h => "Head to Head".to_string(),
        MarketType::PlayerProp => PLAYER_PROP_PREFIXES
            .iter()
            .find_map(|p| key.strip_prefix(p).map(|rest| (p, rest)))
            .map(|(prefix, rest)| {
                format!("{} {}", title_case(prefix.trim_end_matches('_')), title_case(rest))
            })
            .unwrap_or_else(|| title_case(key)),
        MarketType::Other => title_case(key),
    };

    match line_label(instance.key.point) {
        Some(line) => format!("{} ({})", base, line),
        None => base,
    }
}

fn line_label(point: Option<Decimal>) -> Option<String> {
    point.map(|p| p.normalize().to_string())
}

/// "player_points_rebounds" -> "Points Rebounds".
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
