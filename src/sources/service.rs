//! Cache-aside access to cricket data.
//!
//! Reads check the cache first and record the outcome; misses go to the
//! source and populate the cache under the category key. Source failures
//! degrade to empty results and are never cached.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{keys, SharedCache};
use crate::sources::{Match, MatchSource};

#[derive(Clone)]
pub struct CricketDataService {
    cache: SharedCache,
    source: Arc<dyn MatchSource>,
}

impl CricketDataService {
    pub fn new(cache: SharedCache, source: Arc<dyn MatchSource>) -> Self {
        Self { cache, source }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub async fn live_matches(&self) -> Vec<Match> {
        let key = keys::live_matches();
        if let Some(hit) = self.cached(&key).await {
            return hit;
        }

        match self.source.fetch_live_matches().await {
            Ok(matches) => {
                self.populate(key, &matches).await;
                matches
            }
            Err(err) => {
                warn!(error = %err, "live matches unavailable");
                Vec::new()
            }
        }
    }

    pub async fn match_details(&self, match_id: &str) -> Option<Match> {
        let key = keys::match_details(match_id);
        if let Some(hit) = self.cached(&key).await {
            return Some(hit);
        }

        match self.source.fetch_match(match_id).await {
            Ok(Some(found)) => {
                self.populate(key, &found).await;
                Some(found)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(match_id, error = %err, "match details unavailable");
                None
            }
        }
    }

    pub async fn season_fixtures(&self, season_id: &str) -> Vec<Match> {
        let key = keys::season_fixtures(season_id);
        if let Some(hit) = self.cached(&key).await {
            return hit;
        }

        match self.source.fetch_season_fixtures(season_id).await {
            Ok(fixtures) => {
                self.populate(key, &fixtures).await;
                fixtures
            }
            Err(err) => {
                warn!(season_id, error = %err, "season fixtures unavailable");
                Vec::new()
            }
        }
    }

    /// Fetches live matches regardless of the cache and overwrites the
    /// cached copy. On failure the cached copy is left alone and `None`
    /// is returned.
    pub async fn refresh_live_matches(&self) -> Option<usize> {
        match self.source.fetch_live_matches().await {
            Ok(matches) => {
                let count = matches.len();
                self.populate(keys::live_matches(), &matches).await;
                info!(count, "live matches refreshed");
                Some(count)
            }
            Err(err) => {
                warn!(error = %err, "live match refresh failed");
                None
            }
        }
    }

    /// Probes the cache and records a hit or miss. The lock is released
    /// before any fetch.
    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut cache = self.cache.write().await;
        match cache.get_as::<T>(key) {
            Some(value) => {
                cache.record_hit();
                debug!(key, "cache hit");
                Some(value)
            }
            None => {
                cache.record_miss();
                debug!(key, "cache miss");
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: String, value: &T) {
        self.cache.write().await.set_as(key, value, None);
    }
}

impl std::fmt::Debug for CricketDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CricketDataService").finish_non_exhaustive()
    }
}
