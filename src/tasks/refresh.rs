//! Live Match Refresh Task
//!
//! Keeps the live-match cache warm by re-fetching on a timer.

use std::sync::Arc;
use std::time::Duration;

use crate::sources::CricketDataService;
use crate::tasks::PeriodicTask;

#[derive(Debug)]
pub struct RefreshTask {
    task: PeriodicTask,
}

impl RefreshTask {
    pub fn start(service: Arc<CricketDataService>, interval: Duration) -> Self {
        let task = PeriodicTask::spawn("live-refresh", interval, move || {
            let service = service.clone();
            async move {
                // Outcome is logged by the service
                service.refresh_live_matches().await;
            }
        });
        Self { task }
    }

    pub async fn stop(self) {
        self.task.stop().await;
    }
}
