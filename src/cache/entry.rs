//! Cache Entry Module
//!
//! A single cached payload with its insertion and expiry instants.

use std::time::Duration;

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and lifetime metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored payload, opaque to the cache
    pub value: Value,
    /// Insertion timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stored at `now_ms` that lives for `ttl`.
    pub fn new(value: Value, now_ms: u64, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: now_ms,
            expires_at: now_ms.saturating_add(ttl.as_millis() as u64),
        }
    }

    // == Is Expired ==
    /// An entry is visible only while `now < expires_at`; at the boundary
    /// it is already expired.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime at `now_ms`, zero once expired.
    pub fn ttl_remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(now_ms))
    }

    /// Total lifetime the entry was stored with.
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.expires_at - self.stored_at)
    }
}
