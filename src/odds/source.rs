//! Odds source abstraction.

use async_trait::async_trait;

use super::types::Match;
use crate::error::ProviderError;

/// Abstraction over a bookmaker-odds provider.
///
/// The scanner only needs two calls: which sports are active, and the odds
/// for one sport across a set of markets. Implemented by
/// [`super::OddsApiClient`] for the live provider and by
/// [`super::MockOddsSource`] for tests.
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Keys of all sports currently flagged active.
    async fn list_active_sports(&self, api_key: &str) -> Result<Vec<String>, ProviderError>;

    /// Matches with odds for one sport. An empty market list yields an
    /// empty result without contacting the provider.
    async fn fetch_odds(
        &self,
        api_key: &str,
        sport_key: &str,
        region: &str,
        markets: &[String],
    ) -> Result<Vec<Match>, ProviderError>;

    /// Source name for logging.
    fn name(&self) -> &str;
}
