//! Implied probability, profitability and stake allocation calculations.
//!
//! For best prices `p_i`, the implied probability is `1 / p_i`. When the
//! implied probabilities sum to less than one, staking each outcome in
//! proportion to its implied probability pays the same amount whichever
//! outcome wins:
//!
//! ```text
//! stake_i  = total_stake * (1/p_i) / Σ(1/p_j)
//! return_i = stake_i * p_i = total_stake / Σ(1/p_j)
//! ```
//!
//! Rounding a stake to the cent moves its return by up to `p_i * 0.005`, so
//! returns only agree to within that bound.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use time::OffsetDateTime;

use super::classify::MarketType;
use super::grouping::BestOddsMap;

/// One cent: the tolerance for stake sums and equal returns.
pub const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Detected arbitrage opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrageOpportunity {
    /// Stable id: match id, market key and line.
    pub id: String,
    /// Provider match id.
    pub match_id: String,
    /// "Home vs Away".
    pub match_name: String,
    /// Scheduled start, RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// League title.
    pub league: String,
    /// Market key.
    pub market_key: String,
    /// Market category.
    pub market_type: MarketType,
    /// Human-readable market description.
    pub market_description: String,
    /// Best price per outcome.
    #[serde(serialize_with = "serialize_best_odds")]
    pub best_odds: BestOddsMap,
    /// Sum of implied probabilities of the best prices.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_implied_odds: Decimal,
    /// Guaranteed profit in percent of the total stake.
    #[serde(with = "rust_decimal::serde::float")]
    pub arbitrage_percentage: Decimal,
    /// Stake and return per outcome.
    pub outcomes: Vec<OutcomeDetail>,
    /// Return of the first outcome for the normalized stake.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_return_for_100_stake: Decimal,
}

impl ArbitrageOpportunity {
    /// Sum of all outcome stakes.
    pub fn total_stake(&self) -> Decimal {
        self.outcomes.iter().map(|o| o.stake).sum()
    }

    /// Largest minus smallest outcome return.
    pub fn return_spread(&self) -> Decimal {
        return_spread(&self.outcomes)
    }

    /// Guaranteed profit on the normalized stake.
    pub fn guaranteed_profit(&self) -> Decimal {
        self.outcomes
            .iter()
            .map(|o| o.return_amount)
            .min()
            .map(|min| min - self.total_stake())
            .unwrap_or(Decimal::ZERO)
    }
}

/// One row of an opportunity's stake breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeDetail {
    /// Outcome display name.
    pub name: String,
    /// Bookmaker offering the best price.
    pub bookmaker: String,
    /// Decimal odds.
    #[serde(with = "rust_decimal::serde::float")]
    pub odds: Decimal,
    /// Line, if any.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub point: Option<Decimal>,
    /// Amount to stake.
    #[serde(with = "rust_decimal::serde::float")]
    pub stake: Decimal,
    /// Payout if this outcome wins.
    #[serde(rename = "return", with = "rust_decimal::serde::float")]
    pub return_amount: Decimal,
}

#[derive(Serialize)]
struct BestOddsEntry<'a> {
    outcome: &'a str,
    #[serde(with = "rust_decimal::serde::float_option")]
    point: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    bookmaker: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    odds: Decimal,
}

fn serialize_best_odds<S: Serializer>(best: &BestOddsMap, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(best.iter().map(|(key, odds)| BestOddsEntry {
        outcome: key.name(),
        point: key.point(),
        description: key.participant(),
        bookmaker: &odds.bookmaker,
        odds: odds.price,
    }))
}

/// Round to cents, halves away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Implied probability of decimal odds. Zero for non-positive prices.
pub fn implied_probability(price: Decimal) -> Decimal {
    if price > Decimal::ZERO {
        Decimal::ONE / price
    } else {
        Decimal::ZERO
    }
}

/// Sum of implied probabilities.
pub fn total_implied_probability(prices: &[Decimal]) -> Decimal {
    prices.iter().copied().map(implied_probability).sum()
}

/// Whether a total implied probability clears the cutoff.
///
/// `cutoff` is a fraction (0.01 = 1%). The comparison is strict: a total of
/// exactly `1 - cutoff` is not an opportunity.
pub fn is_arbitrage(total_implied: Decimal, cutoff: Decimal) -> bool {
    total_implied > Decimal::ZERO && total_implied < Decimal::ONE - cutoff
}

/// Guaranteed profit percentage for a total implied probability.
pub fn arbitrage_percentage(total_implied: Decimal) -> Decimal {
    (Decimal::ONE - total_implied) * Decimal::ONE_HUNDRED
}

/// Split `total_stake` across outcomes so every outcome returns the same.
///
/// Stakes are rounded to cents, rescaled so they add back up to the total,
/// and rounded again. Any residual larger than a cent goes to the largest
/// stake. Returns all-zero stakes when the prices carry no implied
/// probability, and `None` if the arithmetic overflows.
pub fn allocate_stakes(prices: &[Decimal], total_stake: Decimal) -> Option<Vec<Decimal>> {
    let implied: Vec<Decimal> = prices.iter().copied().map(implied_probability).collect();
    let total_implied: Decimal = implied.iter().sum();

    if total_implied <= Decimal::ZERO {
        return Some(vec![Decimal::ZERO; prices.len()]);
    }

    let mut stakes = implied
        .iter()
        .map(|p| {
            let share = p.checked_div(total_implied)?;
            total_stake.checked_mul(share).map(round_cents)
        })
        .collect::<Option<Vec<Decimal>>>()?;

    let rounded_sum = checked_sum(&stakes)?;
    if !rounded_sum.is_zero() {
        let factor = total_stake.checked_div(rounded_sum)?;
        for stake in stakes.iter_mut() {
            *stake = round_cents(stake.checked_mul(factor)?);
        }
    }

    let residual = total_stake.checked_sub(checked_sum(&stakes)?)?;
    if residual.abs() > CENT {
        let largest = stakes
            .iter()
            .enumerate()
            .max_by_key(|(_, stake)| **stake)
            .map(|(i, _)| i);
        if let Some(i) = largest {
            stakes[i] += residual;
        }
    }

    Some(stakes)
}

fn checked_sum(values: &[Decimal]) -> Option<Decimal> {
    values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
}

/// Payout of a stake at decimal odds, rounded to cents. `None` on overflow.
pub fn outcome_return(stake: Decimal, price: Decimal) -> Option<Decimal> {
    stake.checked_mul(price).map(round_cents)
}

/// Largest minus smallest return across outcome details.
pub fn return_spread(outcomes: &[OutcomeDetail]) -> Decimal {
    let returns = outcomes.iter().map(|o| o.return_amount);
    match (returns.clone().max(), returns.min()) {
        (Some(max), Some(min)) => max - min,
        _ => Decimal::ZERO,
    }
}
