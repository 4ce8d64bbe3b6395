//! Log sink selection and subscriber setup

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

/// Where log lines go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogTarget {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `stdout`, `stderr`, or anything else as a file path
    ///
    /// An empty value means stdout.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "stdout" => Self::Stdout,
            "stderr" => Self::Stderr,
            path => Self::File(PathBuf::from(path)),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }

    /// Directory holding the log file
    pub fn dir(&self) -> Option<&Path> {
        self.file().and_then(Path::parent)
    }
}

impl fmt::Display for LogTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Install the global subscriber
///
/// The returned guard flushes buffered lines on drop and must be held until
/// the program exits.
pub fn init(target: &LogTarget, verbose: bool) -> Result<WorkerGuard> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let (writer, guard) = match target {
        LogTarget::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogTarget::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogTarget::File(path) => {
            let dir = path
                .parent()
                .with_context(|| format!("Invalid log path '{}'", path.display()))?;
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log path '{}'", path.display()))?;

            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory '{}'", dir.display()))?;

            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name))
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(!target.is_file())
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(guard)
}
