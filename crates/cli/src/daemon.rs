//! Foreground daemon lifecycle

use crate::config::{ensure_log_outside, Settings};
use anyhow::{Context, Result};
use tracing::info;
use trd_core::{CancellationContext, WatchTarget};
use trd_watcher::{spawn_signal_bridge, start_watch, WatchError};

/// Run the watcher until a signal arrives
///
/// A signal-driven stop is a normal exit.
pub async fn start(settings: &Settings) -> Result<()> {
    let config = settings.watch_config();
    let target = WatchTarget::resolve(&config.path)?;

    info!("trd {}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());
    info!("Watch file: '{}'", target.file().display());
    info!("Watch dir: '{}'", target.dir().display());
    match settings.log.dir() {
        Some(dir) => info!("Log dir: '{}'", dir.display()),
        None => info!("Log: {}", settings.log),
    }
    info!("Verbose: {}", settings.verbose);

    if let Some(log_file) = settings.log.file() {
        ensure_log_outside(target.dir(), log_file)?;
    }

    for (i, command) in config.commands.iter().enumerate() {
        info!("Command #{}: {}", i + 1, command);
    }
    crate::privileges::check(&config.commands);

    let cancel = CancellationContext::new();
    let bridge = spawn_signal_bridge(cancel.clone()).context("Failed to install signal handlers")?;

    let result = start_watch(config, &cancel).await;

    cancel.stop();
    let _ = bridge.await;

    match result {
        Ok(()) => Ok(()),
        Err(WatchError::Interrupted(err)) => {
            info!("Stopped: {}", err);
            Ok(())
        }
        Err(err) => Err(err).context("Watcher failed"),
    }
}
