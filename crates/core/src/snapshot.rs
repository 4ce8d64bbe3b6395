//! Last known `(size, mtime)` state of the watched file

use parking_lot::RwLock;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Size and modification time of the watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSnapshot {
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified_at: SystemTime,
}

impl FileSnapshot {
    /// Snapshot used when the file does not exist yet
    pub const ZERO: FileSnapshot = FileSnapshot {
        size: 0,
        modified_at: UNIX_EPOCH,
    };

    pub fn new(size: u64, modified_at: SystemTime) -> Self {
        Self { size, modified_at }
    }

    /// Build a snapshot from file metadata
    ///
    /// Platforms without mtime support report the epoch.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            size: metadata.len(),
            modified_at: metadata.modified().unwrap_or(UNIX_EPOCH),
        }
    }

    /// Stat `path`
    pub fn stat(path: &Path) -> io::Result<Self> {
        std::fs::metadata(path).map(|m| Self::from_metadata(&m))
    }
}

impl Default for FileSnapshot {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Holder of the current [`FileSnapshot`]
///
/// Values are replaced wholesale under a lock, so a reader never sees a size
/// from one write paired with an mtime from another.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<FileSnapshot>,
}

impl SnapshotStore {
    pub fn new(initial: FileSnapshot) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Take the initial snapshot of `path`
    ///
    /// Returns the store and whether the file existed.
    pub fn initialize(path: &Path) -> (Self, bool) {
        match FileSnapshot::stat(path) {
            Ok(snapshot) => (Self::new(snapshot), true),
            Err(_) => (Self::new(FileSnapshot::ZERO), false),
        }
    }

    /// Current snapshot
    pub fn load(&self) -> FileSnapshot {
        *self.current.read()
    }

    /// Replace the snapshot if `next` differs from it
    ///
    /// Compare and swap happen under one write lock. Returns the previous
    /// snapshot when a replacement took place.
    pub fn replace_if_changed(&self, next: FileSnapshot) -> Option<FileSnapshot> {
        let mut current = self.current.write();
        if *current == next {
            return None;
        }
        Some(std::mem::replace(&mut *current, next))
    }
}
