//! Market grouping and best-price selection.
//!
//! Quotes from every bookmaker are gathered per market instance (same match,
//! same market key, same line) and reduced to the single best price per
//! outcome.
//!
//! The line of a bookmaker's market is read from its first outcome. A
//! bookmaker market that mixes several lines under one key (some player prop
//! feeds do) is therefore grouped under the first outcome's line only.
//!
//! Outcomes are keyed by participant as well as name and line. Several
//! players quoted under one market key stay separate outcomes of the same
//! instance. Their implied probabilities are summed together, which can hide
//! a single player's opportunity but never pairs one player's Over with
//! another player's Under.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::debug;

use crate::odds::{BookmakerQuote, Market, Match, Outcome};

/// Identifies one line-specific market across bookmakers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketInstanceKey {
    /// Provider match id.
    pub match_id: String,
    /// Market key (e.g. "h2h").
    pub market_key: String,
    /// Line of the market's first outcome, if any.
    pub point: Option<Decimal>,
}

impl MarketInstanceKey {
    /// Key for one bookmaker's market of a match.
    pub fn for_market(event: &Match, market: &Market) -> Self {
        Self {
            match_id: event.id.clone(),
            market_key: market.key.clone(),
            point: market.line(),
        }
    }
}

impl fmt::Display for MarketInstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point {
            Some(point) => write!(f, "{}-{}-{}", self.match_id, self.market_key, point.normalize()),
            None => write!(f, "{}-{}", self.match_id, self.market_key),
        }
    }
}

/// Identifies an outcome within a market instance.
///
/// Structural, so an outcome literally named `Over_5.5` never collides with
/// `Over` on the 5.5 line, and one player's `Over 25.5` never collides with
/// another player's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutcomeKey {
    participant: Option<String>,
    name: String,
    point: Option<Decimal>,
}

impl OutcomeKey {
    /// Key for an outcome name and optional line.
    pub fn new(name: &str, point: Option<Decimal>) -> Self {
        Self {
            participant: None,
            name: name.to_string(),
            point,
        }
    }

    /// Key for a provider outcome, including its participant (the player of
    /// a player prop). Blank descriptions count as absent.
    pub fn for_outcome(outcome: &Outcome) -> Self {
        Self::new(&outcome.name, outcome.point).with_participant(outcome.description.as_deref())
    }

    /// Attach the participant the outcome refers to.
    pub fn with_participant(mut self, participant: Option<&str>) -> Self {
        self.participant = participant
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        self
    }

    /// Outcome name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outcome line, if any.
    pub fn point(&self) -> Option<Decimal> {
        self.point
    }

    /// Participant (player name), if any.
    pub fn participant(&self) -> Option<&str> {
        self.participant.as_deref()
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(participant) = &self.participant {
            write!(f, "{} ", participant)?;
        }
        match self.point {
            Some(point) => write!(f, "{} {}", self.name, point.normalize()),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Best price found for one outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BestOdds {
    /// Bookmaker offering the price.
    pub bookmaker: String,
    /// Decimal odds, always above 1.0.
    pub price: Decimal,
    /// Line, if any.
    pub point: Option<Decimal>,
    /// Extra identifier carried by the winning quote (player name).
    pub description: Option<String>,
}

/// Best price per outcome for one market instance.
pub type BestOddsMap = BTreeMap<OutcomeKey, BestOdds>;

/// Match fields carried alongside a market instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInfo {
    /// Provider match id.
    pub match_id: String,
    /// "Home vs Away".
    pub match_name: String,
    /// League title.
    pub league: String,
    /// Scheduled start.
    pub start_time: OffsetDateTime,
    /// Home team, if known.
    pub home_team: Option<String>,
    /// Away team, if known.
    pub away_team: Option<String>,
}

impl From<&Match> for EventInfo {
    fn from(event: &Match) -> Self {
        Self {
            match_id: event.id.clone(),
            match_name: event.display_name(),
            league: event.sport_title.clone(),
            start_time: event.commence_time,
            home_team: event.home_team.clone(),
            away_team: event.away_team.clone(),
        }
    }
}

/// All bookmaker quotes collected for one market instance.
#[derive(Debug, Clone)]
pub struct QuoteGroup<'a> {
    /// Instance key.
    pub key: MarketInstanceKey,
    /// Match the quotes belong to.
    pub event: &'a Match,
    /// (bookmaker, market) pairs sharing the key, in encounter order.
    pub quotes: Vec<(&'a BookmakerQuote, &'a Market)>,
}

/// A market instance reduced to its best prices.
#[derive(Debug, Clone)]
pub struct MarketInstance {
    /// Instance key.
    pub key: MarketInstanceKey,
    /// Match context.
    pub event: EventInfo,
    /// Best price per outcome.
    pub best_odds: BestOddsMap,
}

/// Group every bookmaker market of every match by market instance.
///
/// Groups appear in the order their key was first encountered.
pub fn group_quotes(matches: &[Match]) -> Vec<QuoteGroup<'_>> {
    let mut groups: Vec<QuoteGroup<'_>> = Vec::new();
    let mut index: HashMap<MarketInstanceKey, usize> = HashMap::new();

    for event in matches {
        for bookmaker in &event.bookmakers {
            for market in &bookmaker.markets {
                let key = MarketInstanceKey::for_market(event, market);
                match index.get(&key) {
                    Some(&i) => groups[i].quotes.push((bookmaker, market)),
                    None => {
                        index.insert(key.clone(), groups.len());
                        groups.push(QuoteGroup {
                            key,
                            event,
                            quotes: vec![(bookmaker, market)],
                        });
                    }
                }
            }
        }
    }

    groups
}

/// Best valid price per outcome across the quotes of one group.
///
/// Prices that are missing or not above 1.0 are ignored. On equal prices the
/// first bookmaker seen keeps the entry.
pub fn best_outcome_odds(group: &QuoteGroup<'_>) -> BestOddsMap {
    let mut best = BestOddsMap::new();

    for (bookmaker, market) in &group.quotes {
        for outcome in &market.outcomes {
            let Some(price) = outcome.valid_price() else {
                continue;
            };

            let key = OutcomeKey::for_outcome(outcome);
            let improves = best.get(&key).map_or(true, |current| price > current.price);
            if improves {
                best.insert(
                    key,
                    BestOdds {
                        bookmaker: bookmaker.title.clone(),
                        price,
                        point: outcome.point,
                        description: outcome.description.clone(),
                    },
                );
            }
        }
    }

    best
}

/// Group matches into market instances and keep those with at least two
/// priced outcomes.
pub fn build_market_instances(matches: &[Match]) -> Vec<MarketInstance> {
    group_quotes(matches)
        .into_iter()
        .filter_map(|group| {
            let best_odds = best_outcome_odds(&group);
            if best_odds.len() < 2 {
                debug!(
                    instance = %group.key,
                    outcomes = best_odds.len(),
                    "Skipping market instance with fewer than two priced outcomes"
                );
                return None;
            }
            Some(MarketInstance {
                event: EventInfo::from(group.event),
                key: group.key,
                best_odds,
            })
        })
        .collect()
}
