//! Integration tests for the arbitrage scanner.
//!
//! Most tests drive the public API against the mock odds source. Tests that
//! hit the real provider need a valid ODDS_API_KEY environment variable.
//! Run them with: cargo test --test integration -- --ignored

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use odds_arb::api::{create_router, AppState};
use odds_arb::arbitrage::{build_market_instances, detect_opportunities, scan, ScanRequest, CENT};
use odds_arb::config::Config;
use odds_arb::odds::mock::{lined_outcome, outcome};
use odds_arb::odds::{acquire_odds, MatchBuilder, MockFailure, MockOddsSource, OddsApiClient, OddsSource};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tower::ServiceExt;

fn request(config: &Config) -> ScanRequest {
    ScanRequest::resolve(Some("test-key"), None, None, None, config).unwrap()
}

fn two_way_match(id: &str, first: (Decimal, Decimal), second: (Decimal, Decimal)) -> odds_arb::odds::Match {
    MatchBuilder::new(id)
        .quote("Bet A", "h2h", vec![outcome("Home", first.0), outcome("Away", first.1)])
        .quote("Bet B", "h2h", vec![outcome("Home", second.0), outcome("Away", second.1)])
        .build()
}

#[tokio::test]
async fn two_bookmakers_cross_arbitrage() {
    let source = MockOddsSource::new();
    source.add_sport("soccer_epl");
    source.set_odds(
        "soccer_epl",
        "h2h",
        vec![two_way_match("m1", (dec!(2.10), dec!(2.10)), (dec!(1.90), dec!(2.30)))],
    );

    let opportunities = scan(&source, &request(&Config::default())).await.unwrap();
    assert_eq!(opportunities.len(), 1);

    let opp = &opportunities[0];
    assert_eq!(opp.total_implied_odds.round_dp(4), dec!(0.9110));
    assert_eq!(opp.arbitrage_percentage.round_dp(2), dec!(8.90));

    let home = opp.outcomes.iter().find(|o| o.name == "Home").unwrap();
    let away = opp.outcomes.iter().find(|o| o.name == "Away").unwrap();
    assert_eq!((home.bookmaker.as_str(), home.odds), ("Bet A", dec!(2.10)));
    assert_eq!((away.bookmaker.as_str(), away.odds), ("Bet B", dec!(2.30)));
    assert_eq!(home.stake + away.stake, dec!(100));
    assert!(opp.return_spread() <= CENT);
    assert!(opp.guaranteed_profit() > dec!(9.7));
}

#[tokio::test]
async fn break_even_market_is_not_reported() {
    let source = MockOddsSource::new();
    source.add_sport("soccer_epl");
    source.set_odds(
        "soccer_epl",
        "h2h",
        vec![two_way_match("m1", (dec!(2.0), dec!(2.0)), (dec!(2.0), dec!(2.0)))],
    );

    let opportunities = scan(&source, &request(&Config::default())).await.unwrap();
    assert!(opportunities.is_empty());
}

#[tokio::test]
async fn failed_fetch_leaves_other_results_intact() {
    let source = MockOddsSource::new();
    source
        .add_sport("soccer_epl")
        .add_sport("basketball_nba")
        .add_sport("icehockey_nhl");
    source.set_odds(
        "soccer_epl",
        "h2h",
        vec![two_way_match("epl-1", (dec!(2.10), dec!(2.10)), (dec!(1.90), dec!(2.30)))],
    );
    source.fail_odds("basketball_nba", "h2h", MockFailure::Network);
    source.set_odds(
        "icehockey_nhl",
        "h2h",
        vec![two_way_match("nhl-1", (dec!(2.20), dec!(1.80)), (dec!(1.70), dec!(2.25)))],
    );

    let state = AppState::new(Arc::new(source), Config::default());
    let response = create_router(state)
        .oneshot(
            Request::builder()
                .uri("/api/arbitrage?apiKey=test-key&region=eu")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let list: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["match_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"epl-1"));
    assert!(ids.contains(&"nhl-1"));
}

#[tokio::test]
async fn missing_api_key_makes_no_provider_calls() {
    let source = MockOddsSource::new();
    source.add_sport("soccer_epl");
    let state = AppState::new(Arc::new(source.clone()), Config::default());

    let response = create_router(state)
        .oneshot(Request::builder().uri("/api/arbitrage").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
        serde_json::json!({ "message": "API key is required" })
    );
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn single_priced_outcome_contributes_nothing() {
    let source = MockOddsSource::new();
    source.add_sport("soccer_epl");
    source.set_odds(
        "soccer_epl",
        "h2h",
        vec![MatchBuilder::new("m1")
            .quote("Bet A", "h2h", vec![outcome("Home", dec!(40.0)), outcome("Away", dec!(0.9))])
            .build()],
    );

    let opportunities = scan(&source, &request(&Config::default())).await.unwrap();
    assert!(opportunities.is_empty());
}

#[tokio::test]
async fn totals_lines_are_scanned_separately() {
    let source = MockOddsSource::new();
    source.add_sport("basketball_nba");
    source.set_odds(
        "basketball_nba",
        "totals",
        vec![MatchBuilder::new("nba-1")
            .sport("basketball_nba", "NBA")
            .teams("Lakers", "Celtics")
            .quote(
                "Bet A",
                "totals",
                vec![lined_outcome("Over", dec!(2.15), dec!(220.5)), lined_outcome("Under", dec!(1.75), dec!(220.5))],
            )
            .quote(
                "Bet B",
                "totals",
                vec![lined_outcome("Over", dec!(1.80), dec!(220.5)), lined_outcome("Under", dec!(2.10), dec!(220.5))],
            )
            .quote(
                "Bet C",
                "totals",
                vec![lined_outcome("Over", dec!(1.90), dec!(222.5)), lined_outcome("Under", dec!(1.90), dec!(222.5))],
            )
            .build()],
    );

    let config = Config::default();
    let request = ScanRequest::resolve(Some("k"), Some("us"), None, Some("totals"), &config).unwrap();
    let opportunities = scan(&source, &request).await.unwrap();

    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].id, "nba-1-totals-220.5");
    assert_eq!(opportunities[0].market_description, "Totals (220.5)");
    assert_eq!(opportunities[0].league, "NBA");
}

#[tokio::test]
async fn repeated_scans_are_byte_identical() {
    let source = MockOddsSource::new();
    source.add_sport("soccer_epl").add_sport("tennis_atp");
    source.set_odds(
        "soccer_epl",
        "h2h",
        vec![
            two_way_match("a", (dec!(2.10), dec!(2.10)), (dec!(1.90), dec!(2.30))),
            two_way_match("b", (dec!(2.5), dec!(1.8)), (dec!(2.2), dec!(1.9))),
        ],
    );
    source.set_odds(
        "tennis_atp",
        "h2h",
        vec![two_way_match("c", (dec!(1.95), dec!(2.2)), (dec!(2.3), dec!(1.7)))],
    );

    let config = Config::default();
    let first = serde_json::to_vec(&scan(&source, &request(&config)).await.unwrap()).unwrap();
    let second = serde_json::to_vec(&scan(&source, &request(&config)).await.unwrap()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn stakes_always_sum_to_total() {
    let source = MockOddsSource::new();
    source.add_sport("soccer_epl");
    let matches: Vec<_> = (0..20)
        .map(|i| {
            let bump = Decimal::new(i, 2);
            MatchBuilder::new(format!("m{}", i))
                .quote(
                    "Bet A",
                    "h2h",
                    vec![outcome("Home", dec!(2.6) + bump), outcome("Draw", dec!(3.1)), outcome("Away", dec!(3.0))],
                )
                .quote(
                    "Bet B",
                    "h2h",
                    vec![outcome("Home", dec!(2.2)), outcome("Draw", dec!(3.9) + bump), outcome("Away", dec!(3.6))],
                )
                .build()
        })
        .collect();
    source.set_odds("soccer_epl", "h2h", matches);

    let report = acquire_odds(&source, "k", "eu", &["h2h".to_string()], Config::default().fetch_timeout())
        .await
        .unwrap();
    let opportunities = detect_opportunities(&build_market_instances(&report.matches), Decimal::ZERO, dec!(100));

    assert_eq!(opportunities.len(), 20);
    for opp in &opportunities {
        assert!((opp.total_stake() - dec!(100)).abs() <= CENT, "{}", opp.id);
        assert!(opp.outcomes.iter().all(|o| o.stake > Decimal::ZERO));
    }
    for pair in opportunities.windows(2) {
        assert!(pair[0].arbitrage_percentage >= pair[1].arbitrage_percentage);
    }
}

/// Get a test config from environment.
fn live_config() -> Option<Config> {
    dotenvy::dotenv().ok();
    let config = Config::load().ok()?;
    config.api_key()?;
    Some(config)
}

/// Test that active sports can be listed with a real key.
#[tokio::test]
#[ignore = "requires ODDS_API_KEY"]
async fn test_list_active_sports() {
    let config = match live_config() {
        Some(c) => c,
        None => {
            println!("Skipping: ODDS_API_KEY not set");
            return;
        }
    };

    let client = OddsApiClient::new(&config).unwrap();
    let sports = client
        .list_active_sports(config.api_key().unwrap_or_default())
        .await;
    assert!(sports.is_ok(), "Failed to list sports: {:?}", sports.err());
    println!("Active sports: {}", sports.unwrap().len());
}

/// Test a full live scan.
#[tokio::test]
#[ignore = "requires ODDS_API_KEY"]
async fn test_live_scan() {
    let config = match live_config() {
        Some(c) => c,
        None => {
            println!("Skipping: ODDS_API_KEY not set");
            return;
        }
    };

    let client = OddsApiClient::new(&config).unwrap();
    let request = ScanRequest::resolve(None, None, None, None, &config).unwrap();
    let result = scan(&client, &request).await;
    assert!(result.is_ok(), "Scan failed: {:?}", result.err());

    for opp in result.unwrap().iter().take(5) {
        println!(
            "{} | {} | {}%",
            opp.match_name,
            opp.market_description,
            opp.arbitrage_percentage.round_dp(2)
        );
    }
}

/// Test that a bogus key is classified as a client error.
#[tokio::test]
#[ignore = "requires network access"]
async fn test_rejected_key() {
    let config = Config::default();
    let client = OddsApiClient::new(&config).unwrap();
    let result = client.list_active_sports("definitely-not-a-key").await;
    let err = result.unwrap_err();
    assert!(err.is_client_error(), "unexpected error: {}", err);
}
