//! Workflow integration tests

pub mod usage;
#[cfg(unix)]
pub mod daemon;
