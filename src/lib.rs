//! Cricket Feed - data core of a fantasy-cricket client
//!
//! A TTL cache with category-based lifetimes in front of live-score
//! sources, and per-owner notification feeds kept current by a live
//! insert channel.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod notifications;
pub mod sources;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, SharedCache};
pub use config::Config;
pub use notifications::{FeedRegistry, MemoryNotificationStore, NotificationFeed};
pub use sources::{CricketDataService, HttpMatchSource};
pub use tasks::{CleanupTask, FeedEvictionTask, RefreshTask};
