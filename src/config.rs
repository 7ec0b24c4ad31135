//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::policy::{FANTASY_PREFIX, MATCHES_PREFIX, PLAYERS_PREFIX};
use crate::cache::TtlPolicy;

/// Base URL of the hosted cricket data API.
pub const DEFAULT_API_BASE: &str = "https://api.cricapi.com/v1";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache sweep interval in seconds
    pub cleanup_interval: u64,
    /// Live-match refresh interval in seconds, 0 disables the timer
    pub refresh_interval: u64,
    /// TTL in seconds for keys without a recognized prefix
    pub default_ttl: u64,
    /// TTL in seconds for `matches_` keys
    pub live_match_ttl: u64,
    /// TTL in seconds for `players_` keys
    pub player_ttl: u64,
    /// TTL in seconds for `fantasy_` keys
    pub fantasy_ttl: u64,
    /// Season fixture source
    pub fixtures_url: String,
    /// In-progress score source
    pub live_scores_url: String,
    /// API key appended to source requests
    pub api_key: Option<String>,
    /// Notifications loaded per feed fetch
    pub notification_fetch_limit: usize,
    /// Seconds a feed may go unrequested before it is unmounted, 0 keeps
    /// feeds for the process lifetime
    pub feed_idle_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` (default: 3000)
    /// - `CLEANUP_INTERVAL` seconds (default: 300)
    /// - `REFRESH_INTERVAL` seconds (default: 60)
    /// - `DEFAULT_TTL`, `LIVE_MATCH_TTL`, `PLAYER_TTL`, `FANTASY_TTL` seconds
    ///   (defaults: 300, 120, 600, 300)
    /// - `FIXTURES_URL`, `LIVE_SCORES_URL` (default: the hosted cricket API)
    /// - `CRICKET_API_KEY` (optional)
    /// - `NOTIFICATION_FETCH_LIMIT` (default: 50)
    /// - `FEED_IDLE_TIMEOUT` seconds (default: 1800)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            refresh_interval: env_or("REFRESH_INTERVAL", defaults.refresh_interval),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            live_match_ttl: env_or("LIVE_MATCH_TTL", defaults.live_match_ttl),
            player_ttl: env_or("PLAYER_TTL", defaults.player_ttl),
            fantasy_ttl: env_or("FANTASY_TTL", defaults.fantasy_ttl),
            fixtures_url: env::var("FIXTURES_URL").unwrap_or(defaults.fixtures_url),
            live_scores_url: env::var("LIVE_SCORES_URL").unwrap_or(defaults.live_scores_url),
            api_key: env::var("CRICKET_API_KEY").ok().filter(|k| !k.is_empty()),
            notification_fetch_limit: env_or(
                "NOTIFICATION_FETCH_LIMIT",
                defaults.notification_fetch_limit,
            ),
            feed_idle_timeout: env_or("FEED_IDLE_TIMEOUT", defaults.feed_idle_timeout),
        }
    }

    /// Prefix table for the cache built from the configured lifetimes.
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy::new(Duration::from_secs(self.default_ttl))
            .with_prefix(MATCHES_PREFIX, Duration::from_secs(self.live_match_ttl))
            .with_prefix(PLAYERS_PREFIX, Duration::from_secs(self.player_ttl))
            .with_prefix(FANTASY_PREFIX, Duration::from_secs(self.fantasy_ttl))
    }

    pub fn cleanup_period(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }

    /// `None` when the refresh timer is disabled.
    pub fn refresh_period(&self) -> Option<Duration> {
        (self.refresh_interval > 0).then(|| Duration::from_secs(self.refresh_interval))
    }

    /// `None` when idle feeds are never evicted.
    pub fn feed_idle_period(&self) -> Option<Duration> {
        (self.feed_idle_timeout > 0).then(|| Duration::from_secs(self.feed_idle_timeout))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 300,
            refresh_interval: 60,
            default_ttl: 300,
            live_match_ttl: 120,
            player_ttl: 600,
            fantasy_ttl: 300,
            fixtures_url: DEFAULT_API_BASE.to_string(),
            live_scores_url: DEFAULT_API_BASE.to_string(),
            api_key: None,
            notification_fetch_limit: 50,
            feed_idle_timeout: 1800,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 300);
        assert_eq!(config.refresh_interval, 60);
        assert_eq!(config.notification_fetch_limit, 50);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_ttl_policy_matches_default_table() {
        assert_eq!(Config::default().ttl_policy(), TtlPolicy::default());
    }

    #[test]
    fn test_periods() {
        let mut config = Config::default();
        assert_eq!(config.cleanup_period(), Duration::from_secs(300));
        assert_eq!(config.refresh_period(), Some(Duration::from_secs(60)));

        assert_eq!(config.feed_idle_period(), Some(Duration::from_secs(1800)));

        config.cleanup_interval = 0;
        config.refresh_interval = 0;
        config.feed_idle_timeout = 0;
        assert_eq!(config.cleanup_period(), Duration::from_secs(1));
        assert_eq!(config.refresh_period(), None);
        assert_eq!(config.feed_idle_period(), None);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("CRICKET_FEED_TEST_PORT", "not-a-number");
        assert_eq!(env_or("CRICKET_FEED_TEST_PORT", 8080u16), 8080);

        env::set_var("CRICKET_FEED_TEST_PORT", "9090");
        assert_eq!(env_or("CRICKET_FEED_TEST_PORT", 8080u16), 9090);
        env::remove_var("CRICKET_FEED_TEST_PORT");
    }
}
