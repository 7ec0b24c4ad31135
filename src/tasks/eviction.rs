//! Idle Feed Eviction Task
//!
//! Unmounts notification feeds no request has touched for a while.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::notifications::FeedRegistry;
use crate::tasks::PeriodicTask;

#[derive(Debug)]
pub struct FeedEvictionTask {
    task: PeriodicTask,
}

impl FeedEvictionTask {
    /// Checks every `interval` and releases feeds idle for `max_idle`.
    pub fn start(registry: Arc<FeedRegistry>, interval: Duration, max_idle: Duration) -> Self {
        let task = PeriodicTask::spawn("feed-eviction", interval, move || {
            let registry = registry.clone();
            async move {
                let released = registry.evict_idle(max_idle).await;
                if released > 0 {
                    info!("Feed eviction: released {} idle feeds", released);
                }
            }
        });
        Self { task }
    }

    pub async fn stop(self) {
        self.task.stop().await;
    }
}
