//! Settings merged from the command line and an optional TOML file

use crate::args::{parse_duration, Cli};
use crate::logging::LogTarget;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use trd_core::{CommandSpec, WatchConfig, DEFAULT_DEBOUNCE, DEFAULT_LOCK_RETRY};

/// On-disk configuration file
///
/// ```toml
/// [watch]
/// commands = ["cp %1 /opt/app/bin", "systemctl restart app"]
/// delay = "5s"
/// lock_retry = "500ms"
/// verbose = true
/// log = "/var/log/trd/app.log"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub watch: WatchSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSection {
    pub commands: Vec<String>,
    pub delay: Option<String>,
    pub lock_retry: Option<String>,
    pub verbose: Option<bool>,
    pub watch_file: Option<bool>,
    pub log: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Fully resolved run settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute path of the watched file
    pub file: PathBuf,
    pub commands: Vec<String>,
    pub delay: Duration,
    pub lock_retry: Duration,
    pub verbose: bool,
    pub foreground: bool,
    pub watch_file: bool,
    pub log: LogTarget,
}

impl Settings {
    /// Merge `cli` with the file named by `--config`, if any
    pub fn resolve(cli: Cli) -> Result<Self> {
        let file_config = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file_config)
    }

    /// Command-line values win; file commands apply only without `-c`
    pub fn merge(cli: Cli, file_config: FileConfig) -> Result<Self> {
        let section = file_config.watch;

        let commands = if cli.commands.is_empty() {
            section.commands
        } else {
            cli.commands
        };
        if commands.is_empty() {
            bail!("empty commands");
        }

        let delay = match cli.delay {
            Some(delay) => delay,
            None => file_duration("delay", section.delay.as_deref())?.unwrap_or(DEFAULT_DEBOUNCE),
        };
        let lock_retry = match cli.lock_retry {
            Some(retry) => retry,
            None => file_duration("lock_retry", section.lock_retry.as_deref())?
                .unwrap_or(DEFAULT_LOCK_RETRY),
        };
        if lock_retry.is_zero() {
            bail!("lock retry must be greater than zero");
        }

        let file = std::path::absolute(&cli.file)
            .with_context(|| format!("Invalid watch path '{}'", cli.file.display()))?;

        let log = match cli.log.or(section.log) {
            Some(value) => match LogTarget::parse(&value) {
                LogTarget::File(path) => LogTarget::File(
                    std::path::absolute(&path)
                        .with_context(|| format!("Invalid log path '{}'", path.display()))?,
                ),
                other => other,
            },
            None => LogTarget::Stdout,
        };

        Ok(Self {
            file,
            commands,
            delay,
            lock_retry,
            verbose: cli.verbose || section.verbose.unwrap_or(false),
            foreground: cli.foreground,
            watch_file: cli.watch_file || section.watch_file.unwrap_or(false),
            log,
        })
    }

    pub fn command_specs(&self) -> Vec<CommandSpec> {
        self.commands.iter().map(|line| CommandSpec::parse(line)).collect()
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig::new(self.file.clone(), self.command_specs())
            .with_debounce(self.delay)
            .with_lock_retry(self.lock_retry)
            .with_verbose(self.verbose)
            .with_watch_file(self.watch_file)
    }

    /// Arguments for the detached foreground child
    pub fn background_args(&self, log_file: &Path) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "--log".to_string(),
            log_file.to_string_lossy().into_owned(),
            "-d".to_string(),
            humantime::format_duration(self.delay).to_string(),
            "--lock-retry".to_string(),
            humantime::format_duration(self.lock_retry).to_string(),
        ];
        if self.verbose {
            args.push("-v".to_string());
        }
        if self.watch_file {
            args.push("--watch-file".to_string());
        }
        for command in &self.commands {
            args.push("-c".to_string());
            args.push(command.clone());
        }
        args.push(self.file.to_string_lossy().into_owned());
        args
    }
}

fn file_duration(key: &str, value: Option<&str>) -> Result<Option<Duration>> {
    value
        .map(|v| parse_duration(v).map_err(|e| anyhow!("invalid `{key}` value '{v}': {e}")))
        .transpose()
}

/// Refuse a log file that lives in the watched directory
///
/// Every log write would otherwise be a directory event.
pub fn ensure_log_outside(watch_dir: &Path, log_file: &Path) -> Result<()> {
    let Some(log_dir) = log_file.parent() else {
        return Ok(());
    };
    let log_dir = log_dir
        .canonicalize()
        .unwrap_or_else(|_| log_dir.to_path_buf());
    if log_dir == watch_dir {
        bail!("watch path can not be equal log path '{}'", log_dir.display());
    }
    Ok(())
}
