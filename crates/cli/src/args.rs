//! Command-line flags

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// trd - run commands when a file is rewritten
///
/// Watches FILE and, once changes have settled and no writer holds the file,
/// runs the given commands in order. `%1` in a command is replaced by the
/// absolute path of FILE.
#[derive(Parser, Debug, Clone)]
#[command(name = "trd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File to watch
    pub file: PathBuf,

    /// Command to run after a change (repeatable, run in order)
    #[arg(short = 'c', long = "command", value_name = "CMD")]
    pub commands: Vec<String>,

    /// Delay on update after last event (default: 3s)
    #[arg(short = 'd', long = "delay", value_name = "DURATION", value_parser = parse_duration)]
    pub delay: Option<Duration>,

    /// Backoff between checks while the file is locked (default: 1s)
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub lock_retry: Option<Duration>,

    /// Print logs and debug information
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in the foreground instead of re-launching in the background
    #[arg(short, long)]
    pub foreground: bool,

    /// Write log to file, stdout, stderr (default: stdout)
    #[arg(long = "log", value_name = "TARGET")]
    pub log: Option<String>,

    /// Also subscribe to the file itself, not just its directory
    #[arg(long)]
    pub watch_file: bool,

    /// Read settings from a TOML file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Parse a human-friendly duration such as `3s`, `500ms` or `1m 30s`
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    humantime::parse_duration(input.trim()).map_err(|e| e.to_string())
}
