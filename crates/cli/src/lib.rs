//! trd command-line front end
//!
//! Flag parsing, settings merge, log setup, background re-launch and the
//! foreground daemon loop.

pub mod args;
pub mod background;
pub mod config;
pub mod daemon;
pub mod logging;
pub mod privileges;

pub use args::Cli;
pub use config::{FileConfig, Settings};
pub use logging::LogTarget;
