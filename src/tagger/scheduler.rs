use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum interval between two successful pulls.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    last_update: Mutex<Option<Instant>>,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_update: Mutex::new(None),
        }
    }

    pub fn last_update(&self) -> Option<Instant> {
        *self.lock()
    }

    /// Returns the remaining wait if a pull at `now` is too early.
    ///
    /// An interval that overflows the clock is never due and reports
    /// [`Duration::MAX`].
    pub fn throttle(&self, now: Instant) -> Option<Duration> {
        let last = (*self.lock())?;
        match last.checked_add(self.interval) {
            Some(next) => (now < next).then(|| next - now),
            None => Some(Duration::MAX),
        }
    }

    /// Records a successful pull at `now`.
    pub fn mark_updated(&self, now: Instant) {
        *self.lock() = Some(now);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        // A poisoned lock still holds a whole timestamp.
        self.last_update
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
