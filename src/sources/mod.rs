//! Sources Module
//!
//! Live-score data collaborators and the cache-aside service in front of
//! them.

mod http;
pub mod models;
mod service;

use async_trait::async_trait;

use crate::error::SourceError;

pub use http::HttpMatchSource;
pub use models::{Innings, Match};
pub use service::CricketDataService;

/// Read-only cricket data provider.
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Matches currently in progress or about to start.
    async fn fetch_live_matches(&self) -> Result<Vec<Match>, SourceError>;

    /// One match with scorecard summary, `None` if the source does not know it.
    async fn fetch_match(&self, match_id: &str) -> Result<Option<Match>, SourceError>;

    /// Fixture list of a season.
    async fn fetch_season_fixtures(&self, season_id: &str) -> Result<Vec<Match>, SourceError>;
}
