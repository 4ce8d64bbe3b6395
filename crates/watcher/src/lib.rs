//! Watch–debounce–trigger engine for trd
//!
//! This crate turns raw file system notifications for one file into a small
//! number of well-timed command runs:
//! - Change detection against the last `(size, mtime)` snapshot
//! - Debouncing via trigger epochs (no timer cancellation)
//! - Lock-aware gating while a writer still holds the file
//! - Fail-fast sequential command execution
//! - A daemon loop that stops on OS signals

pub mod daemon;
pub mod debounce;
pub mod detect;
pub mod error;
pub mod executor;
pub mod gate;
pub mod signals;
pub mod source;

// Re-exports
pub use daemon::{Daemon, DaemonState};
pub use debounce::{DebounceTiming, Scheduler, TriggerOutcome};
pub use detect::{ChangeDetector, Detection};
pub use error::WatchError;
pub use executor::{
    ActionExecutor, CommandFailure, CommandOutput, CommandRunner, ExecutionReport, ProcessRunner,
};
pub use gate::{FlockProbe, LockProbe, LockState};
pub use signals::spawn_signal_bridge;
pub use source::{
    ChannelFeed, ChannelSource, FsEvent, FsEventKind, NotificationSource, NotifySource,
    Subscription,
};

use trd_core::{CancellationContext, WatchConfig};

/// Watch `config.path` until `cancel` is done
///
/// Uses the OS notification backend, `flock` lock probing and real child
/// processes. Returns `Ok(())` on a clean stop.
pub async fn start_watch(
    config: WatchConfig,
    cancel: &CancellationContext,
) -> Result<(), WatchError> {
    Daemon::new(config).run(cancel).await
}
