//! Live channel listener.
//!
//! One task per mounted feed. It merges pushed inserts into the feed and
//! reconciles with a full fetch whenever events were missed.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::notifications::store::{InsertSubscription, SubscriptionEvent};
use crate::notifications::{ChannelState, NotificationFeed};

/// Owned handle to a running listener.
#[derive(Debug)]
pub(crate) struct LiveChannel {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl LiveChannel {
    pub(crate) fn new(shutdown: watch::Sender<bool>, handle: JoinHandle<()>) -> Self {
        Self { shutdown, handle }
    }

    /// Signals the listener and waits for it to finish.
    pub(crate) async fn close(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.handle.await {
            if !err.is_cancelled() {
                warn!(error = %err, "live channel listener panicked");
            }
        }
    }
}

pub(crate) async fn run(
    feed: NotificationFeed,
    mut subscription: InsertSubscription,
    mut stop: watch::Receiver<bool>,
) {
    debug!(owner = %subscription.owner(), "live channel listening");

    loop {
        tokio::select! {
            changed = stop.changed() => {
                // A dropped sender counts as a stop request
                if changed.is_err() || *stop.borrow() {
                    break;
                }
            }
            event = subscription.recv() => match event {
                SubscriptionEvent::Insert(notification) => {
                    feed.apply_push(notification).await;
                }
                SubscriptionEvent::Lagged(skipped) => {
                    warn!(owner = %feed.owner(), skipped, "live channel lagged, reconciling");
                    feed.set_channel_state(ChannelState::Subscribing).await;
                    // fetch_all logs its own failure; the list stays as it was
                    let _ = feed.fetch_all().await;
                    feed.set_channel_state(ChannelState::Subscribed).await;
                }
                SubscriptionEvent::Closed => {
                    warn!(owner = %feed.owner(), "live channel closed by transport");
                    feed.channel_closed().await;
                    return;
                }
            }
        }
    }

    info!(owner = %feed.owner(), "live channel torn down");
}
