//! Elapsed-seconds counter shown next to an in-flight enhancement.

use std::time::Duration;

use inspecta_review::ProgressStage;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Counts ticks while a request is `Searching` or `Analysing`.
///
/// Restarts from zero whenever a new request begins and holds its value once
/// the request finishes. The background task stops when the ticker is dropped.
pub struct ElapsedTicker {
    seconds: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    /// Spawn a ticker counting whole seconds. Must be called inside a tokio runtime.
    pub fn spawn(stages: watch::Receiver<ProgressStage>) -> Self {
        Self::with_tick(stages, Duration::from_secs(1))
    }

    pub fn with_tick(stages: watch::Receiver<ProgressStage>, tick: Duration) -> Self {
        let (tx, seconds) = watch::channel(0);
        let handle = tokio::spawn(run(stages, tx, tick));
        Self { seconds, handle }
    }

    pub fn seconds(&self) -> u64 {
        *self.seconds.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.seconds.clone()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(
    mut stages: watch::Receiver<ProgressStage>,
    tx: watch::Sender<u64>,
    tick: Duration,
) {
    let mut interval = time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut counting = stages.borrow_and_update().is_in_flight();

    loop {
        tokio::select! {
            changed = stages.changed() => {
                if changed.is_err() {
                    break;
                }
                let stage = *stages.borrow_and_update();
                if matches!(stage, ProgressStage::Searching | ProgressStage::Idle) {
                    tx.send_replace(0);
                    interval.reset();
                }
                counting = stage.is_in_flight();
            }
            _ = interval.tick(), if counting => {
                tx.send_modify(|s| *s += 1);
            }
        }
    }
}
