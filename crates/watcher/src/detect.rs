//! Change detection: raw event -> real change or noise

use crate::source::FsEvent;
use std::sync::Arc;
use tracing::{debug, info};
use trd_core::{FileSnapshot, SnapshotStore, WatchTarget};

/// Outcome of classifying one raw event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Event is for some other path
    NotRelevant,
    /// Right path, but a kind that never triggers (remove, rename, metadata)
    Ignored,
    /// Right path, but the file is missing or unchanged
    Spurious,
    /// Size or mtime differ from the stored snapshot; carries the new one
    Changed(FileSnapshot),
}

/// Filters events down to real changes of the watched file
pub struct ChangeDetector {
    target: WatchTarget,
    snapshots: Arc<SnapshotStore>,
    verbose: bool,
}

impl ChangeDetector {
    pub fn new(target: WatchTarget, snapshots: Arc<SnapshotStore>, verbose: bool) -> Self {
        Self {
            target,
            snapshots,
            verbose,
        }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Classify `event`, replacing the stored snapshot on a real change
    pub fn classify(&self, event: &FsEvent) -> Detection {
        if self.verbose {
            info!("Watcher: event '{}'", event);
        }

        if !self.target.matches(&event.path) {
            return Detection::NotRelevant;
        }

        if !event.kind.may_change_contents() {
            debug!(kind = %event.kind, "Ignoring non-content event for watched file");
            return Detection::Ignored;
        }

        let current = match FileSnapshot::stat(&event.path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                info!("Watcher: file not found '{}', {}", event.path.display(), e);
                return Detection::Spurious;
            }
        };

        match self.snapshots.replace_if_changed(current) {
            Some(previous) => {
                if self.verbose {
                    info!(
                        previous_size = previous.size,
                        size = current.size,
                        "Trigger: file changed '{}'",
                        event.path.display()
                    );
                }
                Detection::Changed(current)
            }
            None => {
                debug!(path = %event.path.display(), "Stat unchanged, skipping event");
                Detection::Spurious
            }
        }
    }
}
