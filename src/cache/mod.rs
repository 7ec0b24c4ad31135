//! Cache Module
//!
//! In-memory TTL cache with category-based default lifetimes and
//! caller-recorded hit/miss statistics.

mod entry;
pub mod keys;
pub mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use policy::TtlPolicy;
pub use stats::{CacheStats, HitCounter};
pub use store::{CacheStore, SharedCache};
