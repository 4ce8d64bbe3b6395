//! Error types shared by the trd crates

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the watch model
#[derive(Debug, Error)]
pub enum CoreError {
    /// The watch path could not be made absolute
    #[error("cannot resolve watch path '{path}': {source}")]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The watch path has no containing directory to subscribe to
    #[error("watch path '{0}' has no parent directory")]
    NoParent(PathBuf),

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Terminal error stored by the cancellation context when a signal stops the daemon
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("interrupted by signal '{signal}'")]
pub struct Interrupted {
    /// Name of the signal that arrived first (e.g. `SIGTERM`)
    pub signal: String,
}

impl Interrupted {
    pub fn new(signal: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
