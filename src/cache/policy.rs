//! TTL Policy Module
//!
//! Maps key prefixes to default lifetimes so volatile and stable data can
//! share one cache without per-call TTLs.

use std::time::Duration;

/// Default lifetime of live match data.
pub const LIVE_MATCH_TTL: Duration = Duration::from_secs(2 * 60);
/// Default lifetime of player profiles.
pub const PLAYER_TTL: Duration = Duration::from_secs(10 * 60);
/// Default lifetime of fantasy points.
pub const FANTASY_TTL: Duration = Duration::from_secs(5 * 60);
/// Lifetime for keys matching no prefix.
pub const FALLBACK_TTL: Duration = Duration::from_secs(5 * 60);

pub const MATCHES_PREFIX: &str = "matches_";
pub const PLAYERS_PREFIX: &str = "players_";
pub const FANTASY_PREFIX: &str = "fantasy_";

// == TTL Policy ==
/// Ordered prefix table; the first matching prefix wins.
#[derive(Debug, Clone, PartialEq)]
pub struct TtlPolicy {
    rules: Vec<(String, Duration)>,
    fallback: Duration,
}

impl TtlPolicy {
    /// Empty table where every key gets `fallback`.
    pub fn new(fallback: Duration) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Appends a prefix rule.
    pub fn with_prefix(mut self, prefix: impl Into<String>, ttl: Duration) -> Self {
        self.rules.push((prefix.into(), ttl));
        self
    }

    /// Lifetime for `key` when the caller gives none.
    pub fn ttl_for(&self, key: &str) -> Duration {
        self.rules
            .iter()
            .find(|(prefix, _)| key.starts_with(prefix.as_str()))
            .map(|(_, ttl)| *ttl)
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Duration {
        self.fallback
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(FALLBACK_TTL)
            .with_prefix(MATCHES_PREFIX, LIVE_MATCH_TTL)
            .with_prefix(PLAYERS_PREFIX, PLAYER_TTL)
            .with_prefix(FANTASY_PREFIX, FANTASY_TTL)
    }
}
