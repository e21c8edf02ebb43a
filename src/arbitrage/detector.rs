//! Arbitrage opportunity detection.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::calculator::{
    allocate_stakes, arbitrage_percentage, implied_probability, is_arbitrage, outcome_return,
    return_spread, ArbitrageOpportunity, OutcomeDetail, CENT,
};
use super::classify::{classify_market, describe_market};
use super::grouping::MarketInstance;
use crate::metrics;

/// Check one market instance for an arbitrage opportunity.
///
/// `cutoff` is a fraction (0.01 = 1%); `total_stake` is the amount spread
/// across the outcomes. Pure: the same instance and parameters always give
/// the same result.
pub fn detect_opportunity(
    instance: &MarketInstance,
    cutoff: Decimal,
    total_stake: Decimal,
) -> Option<ArbitrageOpportunity> {
    if instance.best_odds.len() < 2 {
        return None;
    }

    let total_implied: Decimal = instance
        .best_odds
        .values()
        .map(|odds| implied_probability(odds.price))
        .sum();

    if !is_arbitrage(total_implied, cutoff) {
        debug!(
            instance = %instance.key,
            total_implied = %total_implied,
            "No arbitrage"
        );
        return None;
    }

    let prices: Vec<Decimal> = instance.best_odds.values().map(|o| o.price).collect();
    let outcomes = allocate_stakes(&prices, total_stake).and_then(|stakes| {
        instance
            .best_odds
            .iter()
            .zip(stakes)
            .map(|((key, odds), stake)| {
                Some(OutcomeDetail {
                    name: key.to_string(),
                    bookmaker: odds.bookmaker.clone(),
                    odds: odds.price,
                    point: odds.point,
                    stake,
                    return_amount: outcome_return(stake, odds.price)?,
                })
            })
            .collect::<Option<Vec<OutcomeDetail>>>()
    });
    let Some(mut outcomes) = outcomes else {
        warn!(instance = %instance.key, "Skipping market instance: stake arithmetic overflowed");
        return None;
    };
    sort_outcome_details(&mut outcomes);

    let spread = return_spread(&outcomes);
    if spread > CENT {
        warn!(
            instance = %instance.key,
            spread = %spread,
            "Outcome returns differ by more than a cent after rounding"
        );
    }

    let market_type = classify_market(instance);
    let opportunity = ArbitrageOpportunity {
        id: instance.key.to_string(),
        match_id: instance.event.match_id.clone(),
        match_name: instance.event.match_name.clone(),
        start_time: instance.event.start_time,
        league: instance.event.league.clone(),
        market_key: instance.key.market_key.clone(),
        market_type,
        market_description: describe_market(instance, market_type),
        best_odds: instance.best_odds.clone(),
        total_implied_odds: total_implied,
        arbitrage_percentage: arbitrage_percentage(total_implied),
        total_return_for_100_stake: outcomes
            .first()
            .map(|o| o.return_amount)
            .unwrap_or(Decimal::ZERO),
        outcomes,
    };

    info!(
        id = %opportunity.id,
        match_name = %opportunity.match_name,
        arbitrage_pct = %opportunity.arbitrage_percentage.round_dp(4),
        "Arbitrage opportunity detected"
    );
    metrics::inc_opportunities_detected();

    Some(opportunity)
}

/// Check every market instance and return opportunities sorted by
/// arbitrage percentage, highest first. Ties keep instance order.
pub fn detect_opportunities(
    instances: &[MarketInstance],
    cutoff: Decimal,
    total_stake: Decimal,
) -> Vec<ArbitrageOpportunity> {
    let mut opportunities: Vec<ArbitrageOpportunity> = instances
        .iter()
        .filter_map(|instance| detect_opportunity(instance, cutoff, total_stake))
        .collect();

    opportunities.sort_by(|a, b| b.arbitrage_percentage.cmp(&a.arbitrage_percentage));
    opportunities
}

/// Order outcome details: by line when every outcome has one, otherwise by
/// name.
pub fn sort_outcome_details(outcomes: &mut [OutcomeDetail]) {
    if outcomes.iter().all(|o| o.point.is_some()) {
        outcomes.sort_by_key(|o| o.point);
    } else {
        outcomes.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::classify::MarketType;
    use crate::arbitrage::grouping::build_market_instances;
    use crate::odds::mock::{lined_outcome, outcome, MatchBuilder};
    use crate::odds::{Match, Outcome};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn two_way(id: &str, a: (Decimal, Decimal), b: (Decimal, Decimal)) -> Match {
        MatchBuilder::new(id)
            .quote("Bet A", "h2h", vec![outcome("Home", a.0), outcome("Away", a.1)])
            .quote("Bet B", "h2h", vec![outcome("Home", b.0), outcome("Away", b.1)])
            .build()
    }

    #[test]
    fn detects_cross_bookmaker_arbitrage() {
        let event = two_way("m1", (dec!(2.10), dec!(2.10)), (dec!(1.90), dec!(2.30)));
        let instances = build_market_instances(&[event]);

        let opp = detect_opportunity(&instances[0], Decimal::ZERO, dec!(100)).unwrap();

        assert_eq!(opp.id, "m1-h2h");
        assert_eq!(opp.market_type, MarketType::H2h);
        assert_eq!(opp.arbitrage_percentage.round_dp(2), dec!(8.90));

        // Alphabetical: Away before Home.
        assert_eq!(opp.outcomes[0].name, "Away");
        assert_eq!(opp.outcomes[0].bookmaker, "Bet B");
        assert_eq!(opp.outcomes[0].stake, dec!(47.73));
        assert_eq!(opp.outcomes[0].return_amount, dec!(109.78));
        assert_eq!(opp.outcomes[1].name, "Home");
        assert_eq!(opp.outcomes[1].bookmaker, "Bet A");
        assert_eq!(opp.outcomes[1].stake, dec!(52.27));
        assert_eq!(opp.outcomes[1].return_amount, dec!(109.77));

        assert_eq!(opp.total_stake(), dec!(100));
        assert!(opp.return_spread() <= CENT);
        assert_eq!(opp.total_return_for_100_stake, dec!(109.78));
    }

    #[test]
    fn exact_break_even_is_not_an_opportunity() {
        let event = two_way("m1", (dec!(2.0), dec!(2.0)), (dec!(1.9), dec!(1.9)));
        let instances = build_market_instances(&[event]);
        assert!(detect_opportunity(&instances[0], Decimal::ZERO, dec!(100)).is_none());
    }

    #[test]
    fn cutoff_filters_thin_margins() {
        // 1/2.04 + 1/2.04 = 0.98039..., about 1.96% profit.
        let event = two_way("m1", (dec!(2.04), dec!(2.04)), (dec!(1.9), dec!(1.9)));
        let instances = build_market_instances(&[event]);

        assert!(detect_opportunity(&instances[0], dec!(0.01), dec!(100)).is_some());
        assert!(detect_opportunity(&instances[0], dec!(0.02), dec!(100)).is_none());
    }

    #[test]
    fn single_priced_outcome_never_qualifies() {
        let unpriced = Outcome {
            name: "Away".to_string(),
            price: None,
            point: None,
            description: None,
        };
        let event = MatchBuilder::new("m1")
            .quote("Bet A", "h2h", vec![outcome("Home", dec!(50.0)), unpriced])
            .build();

        let instances = build_market_instances(&[event]);
        assert!(detect_opportunities(&instances, Decimal::ZERO, dec!(100)).is_empty());
    }

    #[test]
    fn lined_outcomes_sort_by_point() {
        let event = MatchBuilder::new("m1")
            .quote(
                "Bet A",
                "spreads",
                vec![lined_outcome("Home", dec!(2.15), dec!(1.5)), lined_outcome("Away", dec!(1.80), dec!(-1.5))],
            )
            .quote(
                "Bet B",
                "spreads",
                vec![lined_outcome("Home", dec!(1.80), dec!(1.5)), lined_outcome("Away", dec!(2.15), dec!(-1.5))],
            )
            .build();

        let instances = build_market_instances(&[event]);
        let opp = detect_opportunity(&instances[0], Decimal::ZERO, dec!(100)).unwrap();

        assert_eq!(opp.outcomes[0].point, Some(dec!(-1.5)));
        assert_eq!(opp.outcomes[0].name, "Away -1.5");
        assert_eq!(opp.outcomes[1].point, Some(dec!(1.5)));
        assert_eq!(opp.outcomes[1].name, "Home 1.5");
        assert_eq!(opp.outcomes[0].stake, dec!(50));
    }

    #[test]
    fn player_names_prefix_outcome_names() {
        let mut over = lined_outcome("Over", dec!(2.2), dec!(25.5));
        over.description = Some("LeBron James".to_string());
        let mut under = lined_outcome("Under", dec!(2.1), dec!(25.5));
        under.description = Some("LeBron James".to_string());

        let event = MatchBuilder::new("m1")
            .quote("Bet A", "player_points", vec![over, under])
            .build();

        let instances = build_market_instances(&[event]);
        let opp = detect_opportunity(&instances[0], Decimal::ZERO, dec!(100)).unwrap();
        let names: Vec<&str> = opp.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["LeBron James Over 25.5", "LeBron James Under 25.5"]);
        assert_eq!(opp.market_type, MarketType::PlayerProp);
    }

    #[test]
    fn opportunities_sorted_by_percentage_descending() {
        let small = two_way("small", (dec!(2.05), dec!(2.05)), (dec!(1.9), dec!(1.9)));
        let large = two_way("large", (dec!(2.40), dec!(2.40)), (dec!(1.9), dec!(1.9)));
        let none = two_way("none", (dec!(1.9), dec!(1.9)), (dec!(1.8), dec!(1.8)));
        let tie = two_way("tie", (dec!(2.05), dec!(2.05)), (dec!(1.9), dec!(1.9)));

        let instances = build_market_instances(&[small, large, none, tie]);
        let opps = detect_opportunities(&instances, Decimal::ZERO, dec!(100));

        let ids: Vec<&str> = opps.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["large-h2h", "small-h2h", "tie-h2h"]);
    }

    #[test]
    fn detection_is_deterministic() {
        let events = vec![
            two_way("a", (dec!(2.10), dec!(2.10)), (dec!(1.90), dec!(2.30))),
            two_way("b", (dec!(2.6), dec!(1.7)), (dec!(2.2), dec!(1.95))),
        ];

        let first = serde_json::to_string(&detect_opportunities(
            &build_market_instances(&events),
            Decimal::ZERO,
            dec!(100),
        ))
        .unwrap();
        let second = serde_json::to_string(&detect_opportunities(
            &build_market_instances(&events),
            Decimal::ZERO,
            dec!(100),
        ))
        .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn different_players_on_one_line_do_not_combine() {
        let player = |name: &str, side: &str, price: Decimal| {
            let mut o = lined_outcome(side, price, dec!(25.5));
            o.description = Some(name.to_string());
            o
        };
        // Bob Over at 2.4 against Alice Under at 1.9 would look like 5.7%.
        let event = MatchBuilder::new("m1")
            .quote(
                "Bet A",
                "player_points",
                vec![player("Alice", "Over", dec!(1.9)), player("Alice", "Under", dec!(1.9))],
            )
            .quote(
                "Bet B",
                "player_points",
                vec![player("Bob", "Over", dec!(2.4)), player("Bob", "Under", dec!(1.5))],
            )
            .build();

        let instances = build_market_instances(&[event]);
        assert_eq!(instances.len(), 1);
        assert!(detect_opportunity(&instances[0], Decimal::ZERO, dec!(100)).is_none());
    }

    #[test]
    fn overflowing_prices_are_skipped() {
        let huge = Decimal::from_i128_with_scale(5 * 10i128.pow(27), 0);
        let event = MatchBuilder::new("m1")
            .quote("Bet A", "h2h", vec![outcome("Home", huge), outcome("Away", huge)])
            .build();

        let instances = build_market_instances(&[event]);
        assert!(detect_opportunity(&instances[0], Decimal::ZERO, dec!(100)).is_none());
        assert!(detect_opportunities(&instances, Decimal::ZERO, dec!(100)).is_empty());
    }
}
