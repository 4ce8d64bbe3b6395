//! Debounce/trigger scheduling
//!
//! Every real change records a new epoch and starts a timer. When a timer
//! fires it only proceeds if its epoch is still the latest, then passes the
//! lock gate (retrying with the same epoch while the file is held) and runs
//! the commands. Superseded timers simply expire. Command chains from
//! different triggers never overlap: a trigger that is ready while an earlier
//! chain is still running waits for it, then re-checks its epoch.

use crate::executor::{ActionExecutor, ExecutionReport};
use crate::gate::{LockProbe, LockState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use trd_core::{CancellationContext, EpochClock, TriggerEpoch};

/// Timing knobs for the scheduler
#[derive(Debug, Clone, Copy)]
pub struct DebounceTiming {
    /// Quiescence period after the latest change
    pub delay: Duration,
    /// Backoff between lock checks
    pub lock_retry: Duration,
}

/// How a fired timer ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A newer change took over
    Superseded,
    /// The daemon stopped before the commands could run
    Cancelled,
    /// Commands ran
    Executed(ExecutionReport),
}

/// Coalesces real changes into one command run per quiet period
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    timing: DebounceTiming,
    clock: EpochClock,
    probe: Arc<dyn LockProbe>,
    executor: ActionExecutor,
    /// Held for the whole command chain
    running: Mutex<()>,
    cancel: CancellationContext,
    verbose: bool,
}

impl Scheduler {
    pub fn new(
        path: PathBuf,
        timing: DebounceTiming,
        probe: Arc<dyn LockProbe>,
        executor: ActionExecutor,
        cancel: CancellationContext,
        verbose: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                path,
                timing,
                clock: EpochClock::new(),
                probe,
                executor,
                running: Mutex::new(()),
                cancel,
                verbose,
            }),
        }
    }

    /// Record a real change and start its timer
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self) -> (TriggerEpoch, JoinHandle<TriggerOutcome>) {
        let epoch = self.inner.clock.advance();
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.fire(epoch).await });
        (epoch, handle)
    }

    /// Latest epoch, if any change has been seen
    pub fn current_epoch(&self) -> Option<TriggerEpoch> {
        self.inner.clock.current()
    }
}

impl Inner {
    async fn fire(&self, epoch: TriggerEpoch) -> TriggerOutcome {
        let mut wait = self.timing.delay;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.cancel.done() => {
                    debug!(epoch = %epoch, "Pending trigger dropped on shutdown");
                    return TriggerOutcome::Cancelled;
                }
            }

            if !self.clock.is_current(epoch) {
                return self.superseded(epoch);
            }

            match self.probe.probe(&self.path) {
                LockState::Unlocked => break,
                LockState::Locked => {
                    info!("Trigger: file locked '{}'", self.path.display());
                }
                LockState::NotFound => {
                    info!(
                        "Trigger: file missing '{}', retrying as locked",
                        self.path.display()
                    );
                }
            }

            wait = self.timing.lock_retry;
        }

        let _running = tokio::select! {
            guard = self.running.lock() => guard,
            _ = self.cancel.done() => {
                debug!(epoch = %epoch, "Queued trigger dropped on shutdown");
                return TriggerOutcome::Cancelled;
            }
        };

        // A newer change may have arrived while the previous chain ran
        if !self.clock.is_current(epoch) {
            return self.superseded(epoch);
        }

        TriggerOutcome::Executed(self.executor.execute().await)
    }

    fn superseded(&self, epoch: TriggerEpoch) -> TriggerOutcome {
        if self.verbose {
            info!(epoch = %epoch, "Trigger: superseded by a newer change");
        }
        TriggerOutcome::Superseded
    }
}
