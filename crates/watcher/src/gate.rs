//! Lock probing: is a writer still holding the file?

use std::path::Path;

/// Result of an exclusive-open attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Opened exclusively; nobody else holds it
    Unlocked,
    /// Held by another process
    Locked,
    /// File does not exist (usually mid atomic replace)
    NotFound,
}

/// Exclusive-open probe for the watched file
pub trait LockProbe: Send + Sync {
    fn probe(&self, path: &Path) -> LockState;
}

/// Probe using a non-blocking exclusive `flock`
///
/// The lock is released as soon as the probe's file handle is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlockProbe;

impl FlockProbe {
    pub fn new() -> Self {
        Self
    }
}

impl LockProbe for FlockProbe {
    fn probe(&self, path: &Path) -> LockState {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LockState::NotFound,
            Err(_) => return LockState::Locked,
        };

        if try_lock_exclusive(&file) {
            LockState::Unlocked
        } else {
            LockState::Locked
        }
    }
}

/// Try to acquire exclusive file lock (non-blocking)
#[cfg(unix)]
fn try_lock_exclusive(file: &std::fs::File) -> bool {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock).is_ok()
}

/// Opening succeeded; without advisory locks that is the best signal available
#[cfg(not(unix))]
fn try_lock_exclusive(_file: &std::fs::File) -> bool {
    true
}
