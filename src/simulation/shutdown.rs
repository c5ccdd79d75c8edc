//! Interruptible sleeping for the background tasks

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shared stop flag. Background loops sleep on it between iterations so a
/// bounded run can stop them without waiting out a full interval.
#[derive(Debug, Default)]
pub struct Shutdown {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        self.wake.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `duration` unless a shutdown arrives first.
    /// Returns false when the caller should stop.
    pub fn sleep(&self, duration: Duration) -> bool {
        // A deadline past what Instant can hold means "until shutdown"
        let deadline = Instant::now().checked_add(duration);
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        while !*stopped {
            let Some(deadline) = deadline else {
                stopped = self
                    .wake
                    .wait(stopped)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            };
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            stopped = self
                .wake
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        false
    }
}
