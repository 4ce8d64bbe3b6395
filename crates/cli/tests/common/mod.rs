//! Common utilities for integration tests

pub mod cli;

pub use cli::{wait_exit, wait_until, CommandResult, TrdCommand};
