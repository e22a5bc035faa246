//! Debounced pass scheduling
//!
//! Bursts of triggers collapse into one pass once the worker has been quiet
//! for the debounce period. A periodic tick triggers a pass even without
//! local changes so remote changes are picked up. Passes run on the blocking
//! pool, one at a time.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::Result;
use crate::config::SyncConfig;
use crate::worker::LocalSyncWorker;

/// Background task driving a [`LocalSyncWorker`].
pub struct SyncScheduler {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    /// Start scheduling on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if `config` fails validation.
    pub fn spawn(worker: Arc<LocalSyncWorker>, config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(
            worker,
            config.debounce(),
            config.tick_interval(),
            token.clone(),
        ));
        Ok(Self { token, handle })
    }

    /// Stop scheduling. A pass in progress runs to completion first.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            error!(error = %e, "Sync scheduler task failed");
        }
    }
}

async fn run(
    worker: Arc<LocalSyncWorker>,
    debounce: Duration,
    tick: Duration,
    token: CancellationToken,
) {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = worker.triggered() => debug!("Sync triggered"),
            _ = ticker.tick() => debug!("Periodic sync tick"),
        }

        // Wait for a quiet period, restarting it on every trigger
        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = worker.triggered() => continue,
                _ = sleep(debounce) => break,
            }
        }

        let pass = Arc::clone(&worker);
        match tokio::task::spawn_blocking(move || pass.run_sync()).await {
            // Failures are recorded in the worker status
            Ok(_) => {}
            Err(e) => error!(error = %e, "Sync pass panicked"),
        }
    }

    debug!("Sync scheduler stopped");
}
