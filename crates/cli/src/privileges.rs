//! Privilege checks for configured commands

use tracing::warn;
use trd_core::command::any_runs;
use trd_core::CommandSpec;

#[cfg(unix)]
pub fn is_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

/// Whether the commands need root that we do not have
pub fn missing_root(commands: &[CommandSpec], is_root: bool) -> bool {
    any_runs(commands, "setcap") && !is_root
}

/// Warn when `setcap` will run without root
pub fn check(commands: &[CommandSpec]) {
    if missing_root(commands, is_root()) {
        warn!("Command 'setcap' needs root privileges, current user is not root");
    }
}
