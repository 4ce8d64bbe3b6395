//! Bridge from OS termination signals to the cancellation context

use crate::error::WatchError;
use tokio::task::JoinHandle;
use tracing::info;
use trd_core::{CancellationContext, Interrupted};

/// Install handlers for SIGINT, SIGHUP, SIGTERM and SIGQUIT
///
/// The first signal finishes `cancel` with an [`Interrupted`] error; the
/// bridge task then exits. It also exits if `cancel` finishes some other way.
#[cfg(unix)]
pub fn spawn_signal_bridge(cancel: CancellationContext) -> Result<JoinHandle<()>, WatchError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt()).map_err(WatchError::Signal)?;
    let mut hangup = signal(SignalKind::hangup()).map_err(WatchError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(WatchError::Signal)?;
    let mut quit = signal(SignalKind::quit()).map_err(WatchError::Signal)?;

    Ok(tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = hangup.recv() => "SIGHUP",
            _ = terminate.recv() => "SIGTERM",
            _ = quit.recv() => "SIGQUIT",
            _ = cancel.done() => return,
        };

        info!("Signal '{}'", name);
        cancel.interrupt(Interrupted::new(name));
    }))
}

#[cfg(not(unix))]
pub fn spawn_signal_bridge(cancel: CancellationContext) -> Result<JoinHandle<()>, WatchError> {
    Ok(tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if res.is_ok() {
                    info!("Signal 'CTRL_C'");
                    cancel.interrupt(Interrupted::new("CTRL_C"));
                }
            }
            _ = cancel.done() => {}
        }
    }))
}
