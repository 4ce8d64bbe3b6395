//! Errors returned by the watch engine

use std::path::PathBuf;
use thiserror::Error;
use trd_core::{CoreError, Interrupted};

/// Terminal outcome of [`crate::Daemon::run`] other than a clean stop
#[derive(Debug, Error)]
pub enum WatchError {
    /// Invalid configuration or unresolvable watch path
    #[error(transparent)]
    Setup(#[from] CoreError),

    /// The notification backend could not be created
    #[error("cannot create file watcher: {0}")]
    Backend(#[source] notify::Error),

    /// A path could not be added to the notification backend
    #[error("cannot add path '{path}' to watcher: {source}")]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The daemon was started twice
    #[error("watcher already running")]
    AlreadyRunning,

    /// Signal handlers could not be installed
    #[error("cannot install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    /// Stopped by an OS signal
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

impl WatchError {
    /// Whether this is a setup failure rather than a signal-driven stop
    pub fn is_setup(&self) -> bool {
        !matches!(self, WatchError::Interrupted(_))
    }
}
