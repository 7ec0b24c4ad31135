//! Notifications Module
//!
//! Per-owner notification feeds projected from a persisted store, kept
//! current by a live insert channel.

mod feed;
mod live;
mod memory;
mod model;
mod registry;
pub mod store;

pub use feed::{NotificationFeed, DEFAULT_FETCH_LIMIT};
pub use memory::MemoryNotificationStore;
pub use model::{
    Category, ChannelState, FeedState, NewNotification, Notification, Priority, Toast,
};
pub use registry::FeedRegistry;
pub use store::{InsertSubscription, NotificationStore, SubscriptionEvent};
