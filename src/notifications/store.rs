//! Persisted notification store.
//!
//! The hosted backend holds the truth; feeds only project it. This trait is
//! the seam to that backend: a notifications table plus an insert-event
//! subscription filtered by owner.

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::notifications::{NewNotification, Notification};

#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Up to `limit` records of `owner`, newest first.
    async fn list_for_owner(&self, owner: &str, limit: usize) -> StoreResult<Vec<Notification>>;

    async fn insert(&self, new: NewNotification) -> StoreResult<Notification>;

    /// Marks one of `owner`'s records read. A record of another owner reads
    /// as not found.
    async fn mark_read(&self, owner: &str, id: Uuid) -> StoreResult<()>;

    /// Marks every unread record of `owner` as read. Returns how many
    /// records changed.
    async fn mark_all_read(&self, owner: &str) -> StoreResult<u64>;

    /// Deletes one of `owner`'s records, with the same scoping as `mark_read`.
    async fn delete(&self, owner: &str, id: Uuid) -> StoreResult<()>;

    /// Opens an insert-event subscription for `owner`.
    async fn subscribe_inserts(&self, owner: &str) -> StoreResult<InsertSubscription>;
}

// == Subscription ==
/// What a live subscription yields.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    Insert(Notification),
    /// Events were dropped; the subscriber must reconcile with a full fetch
    Lagged(u64),
    Closed,
}

/// Owner-filtered stream of inserted notifications.
#[derive(Debug)]
pub struct InsertSubscription {
    owner: String,
    receiver: broadcast::Receiver<Notification>,
}

impl InsertSubscription {
    pub fn new(owner: impl Into<String>, receiver: broadcast::Receiver<Notification>) -> Self {
        Self {
            owner: owner.into(),
            receiver,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Next insert for this owner. Cancel safe.
    pub async fn recv(&mut self) -> SubscriptionEvent {
        loop {
            match self.receiver.recv().await {
                Ok(n) if n.owner == self.owner => return SubscriptionEvent::Insert(n),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return SubscriptionEvent::Lagged(skipped)
                }
                Err(broadcast::error::RecvError::Closed) => return SubscriptionEvent::Closed,
            }
        }
    }
}
