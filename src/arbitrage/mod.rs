//! Arbitrage module for detecting opportunities across bookmakers.
//!
//! This module handles:
//! - Grouping bookmaker quotes into market instances and picking best prices
//! - Implied probability and stake calculations
//! - Market classification for descriptions
//! - Opportunity detection and the end-to-end scan

pub mod calculator;
pub mod classify;
pub mod detector;
pub mod grouping;
pub mod scanner;

pub use calculator::{allocate_stakes, ArbitrageOpportunity, OutcomeDetail, CENT};
pub use classify::{classify_market, describe_market, MarketType};
pub use detector::{detect_opportunities, detect_opportunity};
pub use grouping::{build_market_instances, BestOdds, MarketInstance, MarketInstanceKey, OutcomeKey};
pub use scanner::{scan, ScanRequest};
