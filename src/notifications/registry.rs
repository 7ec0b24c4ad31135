//! Per-owner feed instances for the HTTP surface.
//!
//! Feeds are mounted on first use and remounted whenever their live channel
//! has dropped. Feeds nobody asked for within the idle timeout are unmounted
//! by `evict_idle`, so the number of listeners tracks active owners.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::FeedResult;
use crate::notifications::store::NotificationStore;
use crate::notifications::NotificationFeed;

struct FeedSlot {
    feed: NotificationFeed,
    last_used: Instant,
}

pub struct FeedRegistry {
    store: Arc<dyn NotificationStore>,
    limit: usize,
    feeds: RwLock<HashMap<String, FeedSlot>>,
}

impl FeedRegistry {
    pub fn new(store: Arc<dyn NotificationStore>, limit: usize) -> Self {
        Self {
            store,
            limit,
            feeds: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> Arc<dyn NotificationStore> {
        self.store.clone()
    }

    /// Returns the owner's feed, mounting it if it has no live channel. The
    /// map lock is not held while mounting. A feed whose mount fails is
    /// forgotten.
    pub async fn feed_for(&self, owner: &str) -> FeedResult<NotificationFeed> {
        let feed = {
            let mut feeds = self.feeds.write().await;
            let slot = feeds.entry(owner.to_string()).or_insert_with(|| FeedSlot {
                feed: NotificationFeed::with_limit(owner, self.store.clone(), self.limit),
                last_used: Instant::now(),
            });
            slot.last_used = Instant::now();
            slot.feed.clone()
        };

        if feed.is_mounted().await {
            return Ok(feed);
        }

        if let Err(err) = feed.mount().await {
            // Another caller may have mounted it in the meantime
            if !feed.is_mounted().await {
                let mut feeds = self.feeds.write().await;
                if feeds.get(owner).map_or(false, |slot| slot.feed.same_feed(&feed)) {
                    feeds.remove(owner);
                }
            }
            return Err(err);
        }
        Ok(feed)
    }

    /// Unmounts and forgets one owner's feed.
    pub async fn release(&self, owner: &str) -> bool {
        let slot = self.feeds.write().await.remove(owner);
        match slot {
            Some(slot) => {
                slot.feed.unmount().await;
                true
            }
            None => false,
        }
    }

    /// Unmounts every feed not requested within `max_idle`. Returns how many
    /// were released.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let idle: Vec<NotificationFeed> = {
            let mut feeds = self.feeds.write().await;
            let owners: Vec<String> = feeds
                .iter()
                .filter(|(_, slot)| slot.last_used.elapsed() >= max_idle)
                .map(|(owner, _)| owner.clone())
                .collect();
            owners
                .iter()
                .filter_map(|owner| feeds.remove(owner))
                .map(|slot| slot.feed)
                .collect()
        };

        for feed in &idle {
            debug!(owner = %feed.owner(), "releasing idle feed");
            feed.unmount().await;
        }
        idle.len()
    }

    pub async fn len(&self) -> usize {
        self.feeds.read().await.len()
    }

    /// Unmounts every feed.
    pub async fn shutdown(&self) {
        let feeds: Vec<NotificationFeed> = self
            .feeds
            .write()
            .await
            .drain()
            .map(|(_, slot)| slot.feed)
            .collect();
        let count = feeds.len();
        for feed in feeds {
            feed.unmount().await;
        }
        info!(count, "notification feeds unmounted");
    }
}

impl std::fmt::Debug for FeedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRegistry")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
