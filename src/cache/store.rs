//! Cache Store Module
//!
//! HashMap storage with per-entry expiry and prefix-based default lifetimes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, HitCounter, TtlPolicy};
use crate::clock::{SharedClock, SystemClock};

/// Cache handle passed to every component that needs it.
pub type SharedCache = Arc<RwLock<CacheStore>>;

// == Cache Store ==
/// Plain TTL cache. No capacity bound; the periodic sweep keeps abandoned
/// keys from accumulating.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Hit/miss counters fed by callers
    counter: HitCounter,
    /// Default lifetimes by key prefix
    policy: TtlPolicy,
    /// Time source
    clock: SharedClock,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store on the wall clock.
    pub fn new(policy: TtlPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Creates a store reading time from `clock`.
    pub fn with_clock(policy: TtlPolicy, clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            counter: HitCounter::new(),
            policy,
            clock,
        }
    }

    /// Wraps the store into the shared handle.
    pub fn into_shared(self) -> SharedCache {
        Arc::new(RwLock::new(self))
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and
    /// restarting its lifetime. Without `ttl` the prefix table decides.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or_else(|| self.policy.ttl_for(&key));
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);

        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "cache set");
        self.entries.insert(key, entry);
    }

    /// Serializes and stores a typed value. Values that cannot be turned
    /// into JSON are not stored.
    pub fn set_as<T: Serialize>(&mut self, key: impl Into<String>, value: &T, ttl: Option<Duration>) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json, ttl),
            Err(err) => warn!(key = %key, error = %err, "cache value not serializable, skipped"),
        }
    }

    // == Get ==
    /// Returns the value if present and unexpired. An expired entry is
    /// removed and reported as absent. Hit/miss counters are untouched.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                debug!(key = %key, "cache entry expired on read");
                None
            }
            None => None,
        }
    }

    /// Typed read. A stored value of the wrong shape reads as absent.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(err) => {
                warn!(key = %key, error = %err, "cached value has unexpected shape");
                None
            }
        }
    }

    // == Has ==
    /// Presence check with the same expiry rule as `get`.
    pub fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // == Delete ==
    /// Removes an entry. Returns whether one was held.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Hit/Miss Accounting ==
    pub fn record_hit(&mut self) {
        self.counter.record_hit();
    }

    pub fn record_miss(&mut self) {
        self.counter.record_miss();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let expired = self
            .entries
            .values()
            .filter(|entry| entry.is_expired(now))
            .count();

        CacheStats::new(self.entries.len() - expired, expired, &self.counter)
    }

    // == Cleanup ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    // == Time To Live ==
    /// Remaining lifetime of a visible entry.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }

    // == Length ==
    /// Entries held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(TtlPolicy::default())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::policy::{FALLBACK_TTL, LIVE_MATCH_TTL, PLAYER_TTL};
    use crate::clock::ManualClock;
    use serde::Deserialize;
    use serde_json::json;

    fn store_at(start_ms: u64) -> (CacheStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start_ms));
        (CacheStore::with_clock(TtlPolicy::default(), clock.clone()), clock)
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::default();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _) = store_at(0);

        store.set("key1", json!("value1"), None);

        assert_eq!(store.get("key1"), Some(json!("value1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _) = store_at(0);
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_get_does_not_count() {
        let (mut store, _) = store_at(0);
        store.set("key1", json!(1), None);
        store.get("key1");
        store.get("missing");

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_store_delete() {
        let (mut store, _) = store_at(0);

        store.set("key1", json!("value1"), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_clear() {
        let (mut store, _) = store_at(0);
        store.set("a", json!(1), None);
        store.set("b", json!(2), None);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_overwrite_resets_expiry() {
        let (mut store, clock) = store_at(0);

        store.set("key1", json!("value1"), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(8));
        store.set("key1", json!("value2"), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(5));

        assert_eq!(store.get("key1"), Some(json!("value2")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.ttl_remaining("key1"), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (mut store, clock) = store_at(0);

        store.set("key1", json!("value1"), Some(Duration::from_secs(1)));
        assert!(store.get("key1").is_some());

        clock.advance(Duration::from_millis(1_000));

        assert_eq!(store.get("key1"), None);
        // Lazy eviction removed it
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_has_respects_expiry() {
        let (mut store, clock) = store_at(0);
        store.set("key1", json!(true), Some(Duration::from_secs(1)));

        assert!(store.has("key1"));
        clock.advance(Duration::from_secs(2));
        assert!(!store.has("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_prefix_defaults() {
        let (mut store, _) = store_at(0);

        store.set("matches_live", json!([]), None);
        store.set("players_7", json!({}), None);
        store.set("contests_open", json!({}), None);

        assert_eq!(store.ttl_remaining("matches_live"), Some(LIVE_MATCH_TTL));
        assert_eq!(store.ttl_remaining("players_7"), Some(PLAYER_TTL));
        assert_eq!(store.ttl_remaining("contests_open"), Some(FALLBACK_TTL));
    }

    #[test]
    fn test_store_stats() {
        let (mut store, clock) = store_at(0);

        store.set("short", json!(1), Some(Duration::from_secs(1)));
        store.set("long", json!(2), Some(Duration::from_secs(60)));
        store.record_hit();
        store.record_miss();
        clock.advance(Duration::from_secs(2));

        let stats = store.stats();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.valid_items, 1);
        assert_eq!(stats.expired_items, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.cache_hit_rate, 0.5);
    }

    #[test]
    fn test_store_cleanup() {
        let (mut store, clock) = store_at(0);

        store.set("key1", json!("value1"), Some(Duration::from_secs(1)));
        store.set("key2", json!("value2"), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(2));

        assert_eq!(store.cleanup(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
        assert_eq!(store.cleanup(), 0);
    }

    #[test]
    fn test_live_matches_scenario() {
        let (mut store, clock) = store_at(1_000);

        store.set("matches_live", json!([{"id": 1}]), None);
        assert_eq!(store.get("matches_live"), Some(json!([{"id": 1}])));

        clock.advance(LIVE_MATCH_TTL + Duration::from_millis(1));
        assert_eq!(store.get("matches_live"), None);

        store.cleanup();
        assert_eq!(store.stats().total_items, 0);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Player {
        id: u32,
        name: String,
    }

    #[test]
    fn test_store_typed_helpers() {
        let (mut store, _) = store_at(0);
        let player = Player {
            id: 18,
            name: "V Kohli".to_string(),
        };

        store.set_as("players_18", &player, None);
        assert_eq!(store.get_as::<Player>("players_18"), Some(player));

        store.set("players_19", json!("not a player"), None);
        assert_eq!(store.get_as::<Player>("players_19"), None);
    }
}
