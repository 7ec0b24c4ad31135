//! Notification Feed
//!
//! Per-owner projection of the persisted notifications. Mutations go to the
//! store first and are mirrored locally only once the store confirms them,
//! so a failed call leaves the local list exactly as it was.
//!
//! # States
//! - List: `Idle -> Loading -> Ready`. Full fetches run one at a time.
//!   Mutations and pushed inserts confirmed while a fetch is in flight are
//!   applied to the local list at once and replayed onto the fetch result.
//! - Live channel: `Disconnected -> Subscribing -> Subscribed`, dropping back
//!   to `Subscribing` while reconciling after missed events.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{FeedError, FeedResult};
use crate::notifications::live::{self, LiveChannel};
use crate::notifications::store::NotificationStore;
use crate::notifications::{ChannelState, FeedState, NewNotification, Notification, Toast};

/// Records loaded by a full fetch.
pub const DEFAULT_FETCH_LIMIT: usize = 50;

const TOAST_CAPACITY: usize = 32;

#[derive(Debug, Default)]
struct FeedInner {
    notifications: Vec<Notification>,
    state: FeedState,
    channel: ChannelState,
    /// Changes that landed while a full fetch was in flight
    pending: PendingChanges,
    /// A full fetch has succeeded at least once
    loaded: bool,
    /// Set on unmount; late results are dropped
    detached: bool,
}

/// Confirmed changes replayed onto the result of the fetch in flight.
#[derive(Debug, Default)]
struct PendingChanges {
    pushed: Vec<Notification>,
    read: HashSet<Uuid>,
    /// Records created up to this instant were marked read in the store
    all_read_at: Option<DateTime<Utc>>,
    removed: HashSet<Uuid>,
}

impl PendingChanges {
    fn replay(self, list: &mut Vec<Notification>) {
        list.retain(|n| !self.removed.contains(&n.id));
        for n in self.pushed {
            if !self.removed.contains(&n.id) {
                merge_sorted(list, n);
            }
        }
        let all_read_at = self.all_read_at;
        for n in list.iter_mut() {
            if self.read.contains(&n.id) || all_read_at.map_or(false, |at| n.created_at <= at) {
                n.read = true;
            }
        }
    }
}

/// A mutation the store has confirmed.
#[derive(Debug, Clone, Copy)]
enum Confirmed {
    Read(Uuid),
    AllRead,
    Removed(Uuid),
}

/// Cheap to clone; clones share the same state and live channel.
#[derive(Clone)]
pub struct NotificationFeed {
    owner: Arc<str>,
    store: Arc<dyn NotificationStore>,
    limit: usize,
    inner: Arc<RwLock<FeedInner>>,
    toasts: broadcast::Sender<Toast>,
    live: Arc<Mutex<Option<LiveChannel>>>,
    /// Held for the duration of a full fetch
    fetching: Arc<Mutex<()>>,
}

impl NotificationFeed {
    pub fn new(owner: impl Into<String>, store: Arc<dyn NotificationStore>) -> Self {
        Self::with_limit(owner, store, DEFAULT_FETCH_LIMIT)
    }

    pub fn with_limit(owner: impl Into<String>, store: Arc<dyn NotificationStore>, limit: usize) -> Self {
        let (toasts, _) = broadcast::channel(TOAST_CAPACITY);
        Self {
            owner: Arc::from(owner.into()),
            store,
            limit,
            inner: Arc::new(RwLock::new(FeedInner::default())),
            toasts,
            live: Arc::new(Mutex::new(None)),
            fetching: Arc::new(Mutex::new(())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    // == Accessors ==

    /// Local list, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.read().await.notifications.clone()
    }

    pub async fn unread_count(&self) -> usize {
        self.inner
            .read()
            .await
            .notifications
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    pub async fn state(&self) -> FeedState {
        self.inner.read().await.state
    }

    pub async fn channel_state(&self) -> ChannelState {
        self.inner.read().await.channel
    }

    /// Receiver of acknowledgments for pushed notifications.
    pub fn toasts(&self) -> broadcast::Receiver<Toast> {
        self.toasts.subscribe()
    }

    // == Lifecycle ==

    /// Opens the live channel, then loads the list. Subscribing first means
    /// nothing inserted during the load is missed; duplicates are merged by
    /// id. A failed initial load is logged and leaves the feed `Idle`.
    pub async fn mount(&self) -> FeedResult<()> {
        let mut live = self.live.lock().await;
        if live.is_some() {
            return Ok(());
        }

        {
            let mut inner = self.inner.write().await;
            inner.detached = false;
            inner.channel = ChannelState::Subscribing;
        }

        let subscription = match self.store.subscribe_inserts(&self.owner).await {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!(owner = %self.owner, error = %err, "live channel subscribe failed");
                self.inner.write().await.channel = ChannelState::Disconnected;
                return Err(err.into());
            }
        };

        self.inner.write().await.channel = ChannelState::Subscribed;
        let (shutdown, stop) = watch::channel(false);
        let handle = tokio::spawn(live::run(self.clone(), subscription, stop));
        *live = Some(LiveChannel::new(shutdown, handle));
        drop(live);

        info!(owner = %self.owner, "notification feed mounted");

        // Failure is already logged; a later fetch_all retries
        let _ = self.fetch_all().await;
        Ok(())
    }

    /// Tears down the live channel and detaches the feed. In-flight calls
    /// that complete afterwards do not touch local state.
    pub async fn unmount(&self) {
        let channel = self.live.lock().await.take();
        if let Some(channel) = channel {
            channel.close().await;
        }

        let mut inner = self.inner.write().await;
        inner.detached = true;
        inner.channel = ChannelState::Disconnected;
        info!(owner = %self.owner, "notification feed unmounted");
    }

    pub async fn is_mounted(&self) -> bool {
        self.live.lock().await.is_some()
    }

    /// Whether both handles are clones of the same feed.
    pub fn same_feed(&self, other: &NotificationFeed) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // == Fetch All ==
    /// Replaces the local list with the newest records from the store.
    /// Returns the number loaded. A call made while another is in flight
    /// waits for it. On failure the local list is kept and the state goes
    /// back to `Ready` if a list was ever loaded, `Idle` otherwise.
    pub async fn fetch_all(&self) -> FeedResult<usize> {
        let _fetching = self.fetching.lock().await;

        let previous = {
            let mut inner = self.inner.write().await;
            self.ensure_attached(&inner)?;
            let previous = inner.state;
            inner.state = FeedState::Loading;
            inner.pending = PendingChanges::default();
            previous
        };

        let result = self.store.list_for_owner(&self.owner, self.limit).await;

        let mut inner = self.inner.write().await;
        let pending = std::mem::take(&mut inner.pending);
        if inner.detached {
            debug!(owner = %self.owner, "dropping fetch result for detached feed");
            return Ok(0);
        }

        match result {
            Ok(mut fetched) => {
                fetched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                pending.replay(&mut fetched);
                let count = fetched.len();
                inner.notifications = fetched;
                inner.state = FeedState::Ready;
                inner.loaded = true;
                debug!(owner = %self.owner, count, "notifications loaded");
                Ok(count)
            }
            Err(err) => {
                // Pending changes are already in the local list
                inner.state = if inner.loaded || previous == FeedState::Ready {
                    FeedState::Ready
                } else {
                    FeedState::Idle
                };
                warn!(owner = %self.owner, error = %err, "failed to load notifications");
                Err(err.into())
            }
        }
    }

    // == Create ==
    /// Persists a notification. The local list is not touched: the record
    /// arrives through the live channel or the next fetch.
    pub async fn create(&self, new: NewNotification) -> FeedResult<Uuid> {
        self.ensure_attached(&*self.inner.read().await)?;
        match self.store.insert(new).await {
            Ok(created) => Ok(created.id),
            Err(err) => {
                warn!(owner = %self.owner, error = %err, "failed to create notification");
                Err(err.into())
            }
        }
    }

    // == Mark Read ==
    pub async fn mark_read(&self, id: Uuid) -> FeedResult<()> {
        self.ensure_attached(&*self.inner.read().await)?;
        if let Err(err) = self.store.mark_read(&self.owner, id).await {
            warn!(owner = %self.owner, %id, error = %err, "failed to mark notification read");
            return Err(err.into());
        }

        self.mirror(Confirmed::Read(id)).await;
        Ok(())
    }

    // == Mark All Read ==
    /// Idempotent: records already read are left as they are.
    pub async fn mark_all_read(&self) -> FeedResult<u64> {
        self.ensure_attached(&*self.inner.read().await)?;
        let changed = match self.store.mark_all_read(&self.owner).await {
            Ok(changed) => changed,
            Err(err) => {
                warn!(owner = %self.owner, error = %err, "failed to mark all notifications read");
                return Err(err.into());
            }
        };

        self.mirror(Confirmed::AllRead).await;
        Ok(changed)
    }

    // == Remove ==
    pub async fn remove(&self, id: Uuid) -> FeedResult<()> {
        self.ensure_attached(&*self.inner.read().await)?;
        if let Err(err) = self.store.delete(&self.owner, id).await {
            warn!(owner = %self.owner, %id, error = %err, "failed to delete notification");
            return Err(err.into());
        }

        self.mirror(Confirmed::Removed(id)).await;
        Ok(())
    }

    // == Live Channel Hooks ==

    /// Merges a pushed insert. Returns true if the record was new, in which
    /// case a toast is emitted.
    pub(crate) async fn apply_push(&self, notification: Notification) -> bool {
        let mut inner = self.inner.write().await;
        if inner.detached {
            return false;
        }
        if notification.owner.as_str() != &*self.owner {
            return false;
        }

        if inner.state == FeedState::Loading {
            inner.pending.pushed.push(notification.clone());
        }

        let toast = Toast::from(&notification);
        if !merge_sorted(&mut inner.notifications, notification) {
            debug!(owner = %self.owner, id = %toast.notification_id, "duplicate push ignored");
            return false;
        }
        if inner.state == FeedState::Idle {
            inner.state = FeedState::Ready;
        }
        drop(inner);

        info!(owner = %self.owner, title = %toast.title, "new notification");
        // No receivers just means nobody is showing toasts
        let _ = self.toasts.send(toast);
        true
    }

    pub(crate) async fn set_channel_state(&self, state: ChannelState) {
        let mut inner = self.inner.write().await;
        if !inner.detached {
            inner.channel = state;
        }
    }

    /// Called by the listener when the transport gave up.
    pub(crate) async fn channel_closed(&self) {
        self.inner.write().await.channel = ChannelState::Disconnected;
        self.live.lock().await.take();
    }

    fn ensure_attached(&self, inner: &FeedInner) -> FeedResult<()> {
        if inner.detached {
            Err(FeedError::Detached(self.owner.to_string()))
        } else {
            Ok(())
        }
    }

    /// Applies a confirmed mutation to the local list, and remembers it for
    /// the fetch in flight if there is one.
    async fn mirror(&self, change: Confirmed) {
        let mut guard = self.inner.write().await;
        if guard.detached {
            debug!(owner = %self.owner, "dropping mutation result for detached feed");
            return;
        }

        let inner = &mut *guard;
        let loading = inner.state == FeedState::Loading;
        match change {
            Confirmed::Read(id) => {
                if let Some(n) = inner.notifications.iter_mut().find(|n| n.id == id) {
                    n.read = true;
                }
                if loading {
                    inner.pending.read.insert(id);
                }
            }
            Confirmed::AllRead => {
                for n in inner.notifications.iter_mut() {
                    n.read = true;
                }
                if loading {
                    inner.pending.all_read_at = Some(Utc::now());
                }
            }
            Confirmed::Removed(id) => {
                inner.notifications.retain(|n| n.id != id);
                if loading {
                    inner.pending.removed.insert(id);
                }
            }
        }

        if inner.state == FeedState::Idle {
            inner.state = FeedState::Ready;
        }
    }
}

impl std::fmt::Debug for NotificationFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationFeed")
            .field("owner", &self.owner)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

/// Inserts `n` keeping `created_at` descending; later arrivals with an equal
/// timestamp go after existing ones. Returns false if the id is present.
fn merge_sorted(list: &mut Vec<Notification>, n: Notification) -> bool {
    if list.iter().any(|existing| existing.id == n.id) {
        return false;
    }
    let at = list
        .iter()
        .position(|existing| existing.created_at < n.created_at)
        .unwrap_or(list.len());
    list.insert(at, n);
    true
}
