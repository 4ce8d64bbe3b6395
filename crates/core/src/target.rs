//! Absolute location of the watched file

use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};

/// The file being watched plus the directory that gets subscribed
///
/// The directory is what the notification backend watches: the file may not
/// exist yet, and some backends only report reliably at directory granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    file: PathBuf,
    dir: PathBuf,
}

impl WatchTarget {
    /// Resolve `path` against the current directory
    ///
    /// The containing directory is canonicalized when it exists so that event
    /// paths reported by the backend compare equal to [`WatchTarget::file`].
    pub fn resolve(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path).map_err(|source| CoreError::ResolvePath {
            path: path.to_path_buf(),
            source,
        })?;

        let name = absolute
            .file_name()
            .ok_or_else(|| CoreError::NoParent(absolute.clone()))?
            .to_os_string();
        let parent = absolute
            .parent()
            .ok_or_else(|| CoreError::NoParent(absolute.clone()))?;

        let dir = parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf());
        let file = dir.join(name);

        Ok(Self { file, dir })
    }

    /// Absolute path of the watched file
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Absolute path of the containing directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether an event path refers to the watched file
    pub fn matches(&self, path: &Path) -> bool {
        self.file == path
    }
}
