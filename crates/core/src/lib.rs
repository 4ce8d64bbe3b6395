//! Data model for trd
//!
//! This crate provides:
//! - Watch target resolution (file + subscribed directory)
//! - File snapshots and the shared snapshot store
//! - Trigger epochs for timer supersession
//! - Command specs with `%1` placeholder substitution
//! - The process-wide cancellation context
//! - Daemon configuration

pub mod cancel;
pub mod command;
pub mod config;
pub mod epoch;
pub mod error;
pub mod snapshot;
pub mod target;

// Re-exports
pub use cancel::CancellationContext;
pub use command::{format_command, CommandSpec, PATH_PLACEHOLDER};
pub use config::{WatchConfig, DEFAULT_DEBOUNCE, DEFAULT_LOCK_RETRY};
pub use epoch::{EpochClock, TriggerEpoch};
pub use error::{CoreError, Interrupted, Result};
pub use snapshot::{FileSnapshot, SnapshotStore};
pub use target::WatchTarget;
