//! Process-wide cancellation context
//!
//! A one-shot "done" signal plus the terminal error that caused it. The first
//! call that finishes the context wins; later calls are ignored.

use crate::error::Interrupted;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable handle to the shared cancellation state
#[derive(Debug, Clone)]
pub struct CancellationContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    done: watch::Sender<bool>,
    err: Mutex<Option<Interrupted>>,
}

impl CancellationContext {
    pub fn new() -> Self {
        let (done, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                done,
                err: Mutex::new(None),
            }),
        }
    }

    /// Finish the context with a terminal error
    ///
    /// Returns `false` if the context was already done.
    pub fn interrupt(&self, err: Interrupted) -> bool {
        self.finish(Some(err))
    }

    /// Finish the context without an error (caller-initiated stop)
    pub fn stop(&self) -> bool {
        self.finish(None)
    }

    fn finish(&self, err: Option<Interrupted>) -> bool {
        let mut err = err;
        self.inner.done.send_if_modified(|done| {
            if *done {
                return false;
            }
            // Stored before the flag flips so waiters always see the error
            *self.inner.err.lock() = err.take();
            *done = true;
            true
        })
    }

    pub fn is_done(&self) -> bool {
        *self.inner.done.borrow()
    }

    /// Stored terminal error, if a signal finished the context
    pub fn err(&self) -> Option<Interrupted> {
        self.inner.err.lock().clone()
    }

    /// Wait until the context is done
    ///
    /// Resolves immediately if it already is.
    pub async fn done(&self) {
        let mut rx = self.inner.done.subscribe();
        // The sender lives in `inner`, so the channel cannot close while we wait
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for CancellationContext {
    fn default() -> Self {
        Self::new()
    }
}
