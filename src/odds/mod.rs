//! Odds acquisition from the bookmaker-odds provider.
//!
//! This module handles:
//! - Provider data types (sports, matches, bookmaker quotes, outcomes)
//! - The odds provider HTTP client
//! - Concurrent fetching across (sport, market) pairs
//! - Mock source for testing

pub mod acquisition;
pub mod client;
pub mod mock;
pub mod source;
pub mod types;

pub use acquisition::{acquire_odds, fetch_all_odds, AcquisitionReport, FetchFailure};
pub use client::OddsApiClient;
pub use mock::{MatchBuilder, MockFailure, MockOddsSource};
pub use source::OddsSource;
pub use types::{BookmakerQuote, Market, Match, Outcome, Sport};
