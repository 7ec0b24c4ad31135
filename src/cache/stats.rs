//! Cache Statistics Module
//!
//! Hit/miss accounting and the snapshot reported by the cache.

use serde::Serialize;

// == Hit Counter ==
/// Monotonic hit/miss counters recorded by cache callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitCounter {
    hits: u64,
    misses: u64,
}

impl HitCounter {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits = self.hits.saturating_add(1);
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was recorded.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently held, expired or not
    pub total_items: usize,
    /// Entries still visible to readers
    pub valid_items: usize,
    /// Entries past their expiry that no sweep or read has removed yet
    pub expired_items: usize,
    /// Recorded hits
    pub hits: u64,
    /// Recorded misses
    pub misses: u64,
    /// hits / (hits + misses)
    pub cache_hit_rate: f64,
}

impl CacheStats {
    /// Builds a snapshot from entry counts and the hit counter.
    pub fn new(valid_items: usize, expired_items: usize, counter: &HitCounter) -> Self {
        Self {
            total_items: valid_items + expired_items,
            valid_items,
            expired_items,
            hits: counter.hits(),
            misses: counter.misses(),
            cache_hit_rate: counter.hit_rate(),
        }
    }
}
