//! Daemon loop: `Starting -> Watching -> Stopped`

use crate::debounce::{DebounceTiming, Scheduler};
use crate::detect::{ChangeDetector, Detection};
use crate::error::WatchError;
use crate::executor::{ActionExecutor, CommandRunner, ProcessRunner};
use crate::gate::{FlockProbe, LockProbe};
use crate::source::{NotificationSource, NotifySource};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use trd_core::{CancellationContext, SnapshotStore, WatchConfig, WatchTarget};

/// Lifecycle state of a [`Daemon`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Starting,
    Watching,
    Stopped,
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DaemonState::Starting => "starting",
            DaemonState::Watching => "watching",
            DaemonState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Watches one file and runs the configured commands after it settles
pub struct Daemon {
    config: WatchConfig,
    source: Box<dyn NotificationSource>,
    probe: Arc<dyn LockProbe>,
    runner: Arc<dyn CommandRunner>,
    state: DaemonState,
}

impl Daemon {
    /// Daemon backed by OS notifications, `flock` probing and real processes
    pub fn new(config: WatchConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(NotifySource::new()),
            Arc::new(FlockProbe::new()),
            Arc::new(ProcessRunner::new()),
        )
    }

    pub fn with_collaborators(
        config: WatchConfig,
        source: Box<dyn NotificationSource>,
        probe: Arc<dyn LockProbe>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            source,
            probe,
            runner,
            state: DaemonState::Starting,
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    fn transition(&mut self, next: DaemonState) {
        debug!(from = %self.state, to = %next, "Daemon state change");
        self.state = next;
    }

    /// Watch until `cancel` is done
    ///
    /// Returns `Ok(())` on a clean stop, [`WatchError::Interrupted`] when a
    /// signal stopped the daemon, and a setup error if watching never began.
    pub async fn run(&mut self, cancel: &CancellationContext) -> Result<(), WatchError> {
        if self.state != DaemonState::Starting {
            return Err(WatchError::AlreadyRunning);
        }

        if let Err(e) = self.start_watching(cancel).await {
            self.transition(DaemonState::Stopped);
            return Err(e);
        }

        match cancel.err() {
            Some(err) => {
                info!("WatcherStopped: {}", err);
                Err(err.into())
            }
            None => {
                info!("WatcherStopped");
                Ok(())
            }
        }
    }

    async fn start_watching(&mut self, cancel: &CancellationContext) -> Result<(), WatchError> {
        let verbose = self.config.verbose;

        // 1. Resolve target and take the initial snapshot
        self.config.validate()?;
        let target = WatchTarget::resolve(&self.config.path)?;
        let (snapshots, existed) = SnapshotStore::initialize(target.file());

        if verbose {
            if existed {
                let snapshot = snapshots.load();
                info!(
                    "Watcher: File exist '{}' size='{}', modTime='{:?}'",
                    target.file().display(),
                    snapshot.size,
                    snapshot.modified_at
                );
            } else {
                info!("Watcher: File not exist '{}'", target.file().display());
            }
        }

        // 2. Subscribe to the directory (and optionally the file)
        let mut paths = vec![target.dir().to_path_buf()];
        if self.config.watch_file && existed {
            paths.push(target.file().to_path_buf());
        }

        let mut subscription = self.source.subscribe(&paths).inspect_err(|e| {
            error!("Watcher: can not subscribe to '{}', {}", target.dir().display(), e);
        })?;

        self.transition(DaemonState::Watching);

        let detector = ChangeDetector::new(target.clone(), Arc::new(snapshots), verbose);
        let executor = ActionExecutor::new(
            target.file(),
            self.config.commands.clone(),
            Arc::clone(&self.runner),
        );
        let scheduler = Scheduler::new(
            target.file().to_path_buf(),
            DebounceTiming {
                delay: self.config.debounce,
                lock_retry: self.config.lock_retry,
            },
            Arc::clone(&self.probe),
            executor,
            cancel.clone(),
            verbose,
        );

        // 3. Dispatch until cancelled
        let mut pending: Vec<JoinHandle<_>> = Vec::new();
        let mut events_open = true;
        let mut errors_open = true;

        loop {
            tokio::select! {
                event = subscription.events.recv(), if events_open => match event {
                    Some(event) => {
                        if let Detection::Changed(_) = detector.classify(&event) {
                            pending.retain(|handle| !handle.is_finished());
                            pending.push(scheduler.trigger().1);
                        }
                    }
                    None => {
                        warn!("Watcher: event stream closed");
                        events_open = false;
                    }
                },
                err = subscription.errors.recv(), if errors_open => match err {
                    Some(err) => warn!("WatcherError: {:#}", err),
                    None => errors_open = false,
                },
                _ = cancel.done() => break,
            }
        }

        // 4. Release the subscription and let in-flight commands finish
        subscription.close();
        for handle in pending {
            let _ = handle.await;
        }
        self.transition(DaemonState::Stopped);

        Ok(())
    }
}
