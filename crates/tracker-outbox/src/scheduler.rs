//! Periodic retry task.

use crate::delivery::Delivery;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Background task that runs one retry tick per interval.
///
/// There is no pause state: the task ticks until stopped. Stopping does
/// not cancel a tick already in progress, and dropping the scheduler
/// stops it.
pub(crate) struct RetryScheduler {
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RetryScheduler {
    /// Spawn the ticking task on `runtime`. The first tick fires one
    /// interval after spawning.
    pub(crate) fn spawn(delivery: Arc<Delivery>, runtime: &Handle) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let period = delivery.policy().interval;

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(interval_secs = period.as_secs(), "Retry scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        delivery.retry_tick().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Retry scheduler stopped");
        });

        Self {
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Signal the task to stop. Idempotent.
    pub(crate) fn stop(&self) {
        let was_running = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if was_running {
            debug!("Stopping retry scheduler");
            let _ = self.shutdown.send(true);
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
