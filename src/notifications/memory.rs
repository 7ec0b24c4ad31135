//! In-process notification store.
//!
//! Backs the local service and the test suite. Inserts are fanned out on a
//! broadcast channel the same way the hosted backend pushes row inserts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::clock::{SharedClock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::notifications::store::{InsertSubscription, NotificationStore};
use crate::notifications::{NewNotification, Notification};

/// Buffer of the insert channel.
const INSERT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct MemoryNotificationStore {
    rows: RwLock<HashMap<Uuid, Notification>>,
    inserts: RwLock<broadcast::Sender<Notification>>,
    capacity: usize,
    available: AtomicBool,
    clock: SharedClock,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: SharedClock) -> Self {
        Self::with_capacity(clock, INSERT_CHANNEL_CAPACITY)
    }

    /// Store whose insert channel holds `capacity` undelivered events.
    pub fn with_capacity(clock: SharedClock, capacity: usize) -> Self {
        let (inserts, _) = broadcast::channel(capacity);
        Self {
            rows: RwLock::new(HashMap::new()),
            inserts: RwLock::new(inserts),
            capacity,
            available: AtomicBool::new(true),
            clock,
        }
    }

    /// Simulates an outage: every call fails with `Unavailable` while false.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Writes a row without publishing an insert event.
    pub async fn seed(&self, notification: Notification) {
        self.rows.write().await.insert(notification.id, notification);
    }

    /// Ends every open subscription; later subscribers get a fresh channel.
    /// Returns how many subscribers were cut off.
    pub async fn close_subscriptions(&self) -> usize {
        let (replacement, _) = broadcast::channel(self.capacity);
        let old = std::mem::replace(&mut *self.inserts.write().await, replacement);
        old.receiver_count()
    }

    pub async fn get(&self, id: Uuid) -> Option<Notification> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("notification store offline".to_string()))
        }
    }
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn list_for_owner(&self, owner: &str, limit: usize) -> StoreResult<Vec<Notification>> {
        self.ensure_available()?;
        let rows = self.rows.read().await;
        let mut list: Vec<Notification> = rows
            .values()
            .filter(|n| n.owner == owner)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list.truncate(limit);
        Ok(list)
    }

    async fn insert(&self, new: NewNotification) -> StoreResult<Notification> {
        self.ensure_available()?;
        if new.owner.is_empty() {
            return Err(StoreError::Rejected("owner is required".to_string()));
        }

        let notification = new.into_notification(Uuid::new_v4(), self.clock.now_utc());
        self.rows
            .write()
            .await
            .insert(notification.id, notification.clone());

        // No receivers is not an error: nobody is listening yet
        let delivered = self.inserts.read().await.send(notification.clone()).unwrap_or(0);
        debug!(id = %notification.id, delivered, "notification inserted");
        Ok(notification)
    }

    async fn mark_read(&self, owner: &str, id: Uuid) -> StoreResult<()> {
        self.ensure_available()?;
        let now = self.clock.now_utc();
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(&id)
            .filter(|row| row.owner == owner)
            .ok_or(StoreError::NotFound(id))?;
        if !row.read {
            row.read = true;
            row.updated_at = now;
        }
        Ok(())
    }

    async fn mark_all_read(&self, owner: &str) -> StoreResult<u64> {
        self.ensure_available()?;
        let now = self.clock.now_utc();
        let mut rows = self.rows.write().await;
        let mut changed = 0;
        for row in rows.values_mut().filter(|n| n.owner == owner && !n.read) {
            row.read = true;
            row.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, owner: &str, id: Uuid) -> StoreResult<()> {
        self.ensure_available()?;
        let mut rows = self.rows.write().await;
        if !rows.get(&id).map_or(false, |row| row.owner == owner) {
            return Err(StoreError::NotFound(id));
        }
        rows.remove(&id);
        Ok(())
    }

    async fn subscribe_inserts(&self, owner: &str) -> StoreResult<InsertSubscription> {
        self.ensure_available()?;
        let receiver = self.inserts.read().await.subscribe();
        Ok(InsertSubscription::new(owner, receiver))
    }
}
