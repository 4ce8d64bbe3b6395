//! Trigger epochs: version stamps for pending debounce timers
//!
//! Instead of cancelling a pending timer when a newer change arrives, every
//! change records a fresh epoch. A timer only proceeds if the epoch it
//! captured is still the latest one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanosecond timestamp identifying one debounce cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerEpoch(u64);

impl fmt::Display for TriggerEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Holder of the current epoch
///
/// Epochs handed out by [`EpochClock::advance`] are strictly increasing even
/// if the wall clock is coarse or steps backwards.
#[derive(Debug, Default)]
pub struct EpochClock {
    current: AtomicU64,
}

impl EpochClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new epoch and make it current
    pub fn advance(&self) -> TriggerEpoch {
        let now = now_nanos();
        let mut current = self.current.load(Ordering::SeqCst);
        loop {
            let next = now.max(current + 1);
            match self
                .current
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return TriggerEpoch(next),
                Err(actual) => current = actual,
            }
        }
    }

    /// The latest epoch, or `None` before the first change
    pub fn current(&self) -> Option<TriggerEpoch> {
        match self.current.load(Ordering::SeqCst) {
            0 => None,
            nanos => Some(TriggerEpoch(nanos)),
        }
    }

    /// Whether `epoch` has not been superseded
    pub fn is_current(&self, epoch: TriggerEpoch) -> bool {
        self.current.load(Ordering::SeqCst) == epoch.0
    }
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
