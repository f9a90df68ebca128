//! Background refresh loop.
//!
//! A single tokio task runs a refresh cycle on every tick and never overlaps
//! two cycles. Shutdown waits a bounded time, then aborts the task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::RefreshScheduler;

/// Default bound on how long [`Poller::shutdown()`] waits for the loop.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle for the background task driving [`RefreshScheduler::run_once()`].
///
/// The first cycle runs immediately, then one per `interval`. A cycle that
/// overruns the interval delays the next tick instead of overlapping it.
pub struct Poller {
    task: JoinHandle<()>,
    shutdown_tx: mpsc::Sender<()>,
    interval: Duration,
}

impl Poller {
    /// Spawn the refresh loop on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, or if `interval` is zero.
    pub fn spawn(scheduler: Arc<RefreshScheduler>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => scheduler.run_once().await,
                    _ = shutdown_rx.recv() => break,
                }
            }
            debug!("refresh loop stopped");
        });

        info!(interval_secs = interval.as_secs(), "polling scheduler started");
        Self {
            task,
            shutdown_tx,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop, waiting at most `timeout` for a running cycle to end.
    ///
    /// A cycle still running after `timeout` is aborted.
    pub async fn shutdown(mut self, timeout: Duration) {
        // A full channel means shutdown was already requested.
        let _ = self.shutdown_tx.try_send(());

        match tokio::time::timeout(timeout, &mut self.task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(error = %e, "refresh loop terminated abnormally"),
            Err(_) => {
                warn!("refresh loop didn't stop in time; aborting");
                self.task.abort();
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // No-op if shutdown() already ran to completion.
        self.task.abort();
    }
}
