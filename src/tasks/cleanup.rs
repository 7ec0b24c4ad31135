//! TTL Cleanup Task
//!
//! Background sweep that removes expired cache entries nobody reads again.

use std::time::Duration;

use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::tasks::PeriodicTask;

/// Default sweep interval.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodic cache sweep owned by the process.
///
/// # Example
/// ```ignore
/// let cache = CacheStore::default().into_shared();
/// let cleanup = CleanupTask::start(cache.clone(), DEFAULT_CLEANUP_INTERVAL);
/// // Later, during shutdown:
/// cleanup.stop().await;
/// ```
#[derive(Debug)]
pub struct CleanupTask {
    task: PeriodicTask,
}

impl CleanupTask {
    pub fn start(cache: SharedCache, interval: Duration) -> Self {
        let task = PeriodicTask::spawn("cache-cleanup", interval, move || {
            let cache = cache.clone();
            async move {
                let removed = cache.write().await.cleanup();
                if removed > 0 {
                    info!("TTL cleanup: removed {} expired entries", removed);
                } else {
                    debug!("TTL cleanup: no expired entries found");
                }
            }
        });
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn stop(self) {
        self.task.stop().await;
    }
}
