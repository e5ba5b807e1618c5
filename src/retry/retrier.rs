use std::fmt::Display;
use std::time::Duration;

use tokio::time::Instant;

use super::{RetryError, RetryErrorKind};

/// How a [`Retrier`] reacts to failed attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStrategy {
    /// A single failure is permanent.
    OneTry,
    /// Up to `count` attempts, at least `delay` apart.
    RetryCount { count: u32, delay: Duration },
    /// Unbounded attempts; the delay doubles from `initial` up to `max`.
    Backoff { initial: Duration, max: Duration },
}

/// Observable state of a [`Retrier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStatus {
    Disconnected,
    /// `attempt` failed attempts so far.
    Retrying { attempt: u32 },
    Connected,
    PermanentlyFailed,
    Closed,
}

/// Drives a fallible setup attempt through the [`RetryStatus`] state machine.
///
/// The retrier never sleeps. A trigger issued before the next retry instant
/// fails with [`RetryErrorKind::WillRetry`] without running the attempt. A
/// delay too large to represent as an instant means the retry is never due.
#[derive(Debug)]
pub struct Retrier {
    name: String,
    strategy: RetryStrategy,
    status: RetryStatus,
    tries: u32,
    next_try: Option<Instant>,
    last_error: Option<String>,
}

impl Retrier {
    pub fn new(name: impl Into<String>, strategy: RetryStrategy) -> Self {
        Self {
            name: name.into(),
            strategy,
            status: RetryStatus::Disconnected,
            tries: 0,
            next_try: None,
            last_error: None,
        }
    }

    pub fn status(&self) -> RetryStatus {
        self.status
    }

    /// Number of consecutive failed attempts.
    pub fn attempts(&self) -> u32 {
        self.tries
    }

    pub fn next_try(&self) -> Option<Instant> {
        self.next_try
    }

    /// Moves the retrier to [`RetryStatus::Closed`]; every later trigger fails permanently.
    pub fn close(&mut self) {
        self.status = RetryStatus::Closed;
        self.next_try = None;
    }

    /// Runs `attempt` if the current state allows it and records the outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`RetryErrorKind::WillRetry`] error if the attempt failed (or
    /// was not yet due) and more attempts are allowed, and a
    /// [`RetryErrorKind::PermaFail`] error once the budget is exhausted or the
    /// retrier was closed.
    pub async fn trigger<F, Fut, E>(&mut self, attempt: F) -> Result<(), RetryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        match self.status {
            RetryStatus::Connected => return Ok(()),
            RetryStatus::PermanentlyFailed => return Err(self.error(RetryErrorKind::PermaFail)),
            RetryStatus::Closed => {
                return Err(RetryError::new(
                    &self.name,
                    RetryErrorKind::PermaFail,
                    "closed",
                ));
            }
            RetryStatus::Retrying { .. } => {
                // No instant while retrying: the delay overflowed.
                if self.next_try.is_none_or(|next| Instant::now() < next) {
                    return Err(self.error(RetryErrorKind::WillRetry));
                }
            }
            RetryStatus::Disconnected => {}
        }

        match attempt().await {
            Ok(()) => {
                log::debug!("{}: attempt succeeded after {} failures", self.name, self.tries);
                self.status = RetryStatus::Connected;
                self.tries = 0;
                self.next_try = None;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.tries += 1;
                self.last_error = Some(err.to_string());
                match self.next_delay() {
                    Some(delay) => {
                        log::debug!(
                            "{}: attempt {} failed, next attempt in {:?}: {}",
                            self.name,
                            self.tries,
                            delay,
                            err
                        );
                        self.status = RetryStatus::Retrying {
                            attempt: self.tries,
                        };
                        self.next_try = Instant::now().checked_add(delay);
                        Err(self.error(RetryErrorKind::WillRetry))
                    }
                    None => {
                        log::warn!(
                            "{}: giving up after {} failed attempts: {}",
                            self.name,
                            self.tries,
                            err
                        );
                        self.status = RetryStatus::PermanentlyFailed;
                        self.next_try = None;
                        Err(self.error(RetryErrorKind::PermaFail))
                    }
                }
            }
        }
    }

    /// Delay before the next attempt, or `None` if the last failure is permanent.
    fn next_delay(&self) -> Option<Duration> {
        match self.strategy {
            RetryStrategy::OneTry => None,
            RetryStrategy::RetryCount { count, delay } => (self.tries < count).then_some(delay),
            RetryStrategy::Backoff { initial, max } => {
                let exp = self.tries.saturating_sub(1).min(31);
                Some(initial.saturating_mul(1u32 << exp).min(max))
            }
        }
    }

    fn error(&self, kind: RetryErrorKind) -> RetryError {
        let message = self.last_error.as_deref().unwrap_or("no attempt made");
        RetryError::new(&self.name, kind, message)
    }
}
