//! Background Tasks Module
//!
//! Periodic work owned by the running process.
//!
//! # Tasks
//! - TTL Cleanup: sweeps expired cache entries (default every 5 minutes)
//! - Live Refresh: re-fetches live matches into the cache
//! - Feed Eviction: unmounts notification feeds nobody has asked for lately

mod cleanup;
mod eviction;
mod periodic;
mod refresh;

pub use cleanup::{CleanupTask, DEFAULT_CLEANUP_INTERVAL};
pub use eviction::FeedEvictionTask;
pub use periodic::PeriodicTask;
pub use refresh::RefreshTask;
