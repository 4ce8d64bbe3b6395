//! Immutable daemon configuration

use crate::command::CommandSpec;
use crate::error::{CoreError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default quiescence period after the last change
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(3);

/// Default backoff while the file is still held by a writer
pub const DEFAULT_LOCK_RETRY: Duration = Duration::from_secs(1);

/// Everything the daemon needs, fixed at startup
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// File to watch (resolved to an absolute path on start)
    pub path: PathBuf,
    /// Commands run in order after each settled change
    pub commands: Vec<CommandSpec>,
    /// Quiescence period; zero fires as soon as possible
    pub debounce: Duration,
    /// Delay between lock checks while the file is locked; must be non-zero
    pub lock_retry: Duration,
    /// Emit per-event informational lines
    pub verbose: bool,
    /// Subscribe to the file itself in addition to its directory
    pub watch_file: bool,
}

impl WatchConfig {
    pub fn new(path: impl Into<PathBuf>, commands: Vec<CommandSpec>) -> Self {
        Self {
            path: path.into(),
            commands,
            debounce: DEFAULT_DEBOUNCE,
            lock_retry: DEFAULT_LOCK_RETRY,
            verbose: false,
            watch_file: false,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_lock_retry(mut self, lock_retry: Duration) -> Self {
        self.lock_retry = lock_retry;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_watch_file(mut self, watch_file: bool) -> Self {
        self.watch_file = watch_file;
        self
    }

    /// Check the configuration before the daemon starts
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig("empty watch path".into()));
        }
        if self.commands.is_empty() {
            return Err(CoreError::InvalidConfig("empty commands".into()));
        }
        if self.lock_retry.is_zero() {
            return Err(CoreError::InvalidConfig(
                "lock retry must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
