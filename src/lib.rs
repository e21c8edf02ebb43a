//! Sports-betting arbitrage scanner.
//!
//! Collects decimal odds from many bookmakers through an odds provider,
//! picks the best price for every outcome of every market, and reports the
//! markets where backing all outcomes at those prices returns more than the
//! total stake, whichever outcome wins.
//!
//! # Strategy
//!
//! If the implied probabilities of the best prices sum to less than one,
//! staking each outcome in proportion to its implied probability guarantees
//! a profit:
//!
//! ```text
//! Home @ 2.10 (Bet A)   1/2.10 = 0.4762
//! Away @ 2.30 (Bet B)   1/2.30 = 0.4348
//! ───────────────────────────────────
//! Total implied:               0.9110 < 1.0
//! Profit:                      8.90% of the stake
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`odds`]: Provider types, client and concurrent acquisition
//! - [`arbitrage`]: Grouping, calculations, detection and scanning
//! - [`api`]: HTTP API for scans, health and metrics
//! - [`metrics`]: Prometheus metric helpers
//! - [`utils`]: Utility functions

pub mod api;
pub mod arbitrage;
pub mod config;
pub mod error;
pub mod metrics;
pub mod odds;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
