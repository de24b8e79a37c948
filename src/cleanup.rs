//! Periodic soft-deletion of customers older than a fixed age.
//!
//! Runs beside the HTTP server on its own timer and calls the repository
//! directly. Stopping is explicit: [`CleanupScheduler::shutdown`] cancels the
//! timer and waits for an in-flight tick to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::repository::{CustomerRepository, RepoResult};

pub struct CleanupScheduler {
    repo: Arc<dyn CustomerRepository>,
    period: Duration,
    max_age_secs: u64,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CleanupScheduler {
    pub fn new(repo: Arc<dyn CustomerRepository>, period: Duration, max_age_secs: u64) -> Self {
        Self { repo, period, max_age_secs, cancel: CancellationToken::new(), handle: None }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawns the repeating timer. Calling it again while running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let repo = self.repo.clone();
        let period = self.period;
        let max_age_secs = self.max_age_secs;
        let cancel = self.cancel.child_token();

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let _ = run_once(repo.as_ref(), max_age_secs).await;
                    }
                }
            }
            tracing::debug!("CRON: cleanup stopped");
        }));
        tracing::info!(
            "CRON: cleaning up entries older than {}s every {}ms",
            max_age_secs,
            period.as_millis()
        );
    }

    /// Cancels the timer and waits for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!("CRON: cleanup task ended abnormally: {}", e);
            }
        }
    }
}

/// One cleanup tick: logs failures, and the row count when it is non-zero.
pub async fn run_once(repo: &dyn CustomerRepository, max_age_secs: u64) -> RepoResult<u64> {
    let res = repo.delete_old(max_age_secs).await;
    match &res {
        Err(e) => tracing::error!("CRON: {}", e),
        Ok(0) => {}
        Ok(rows) => tracing::info!("CRON: deleted {} old entries", rows),
    }
    res
}
