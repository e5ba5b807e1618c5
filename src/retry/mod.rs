//! Retry bookkeeping for resources that need a successful setup call before use.
//!
//! A [`Retrier`] wraps a fallible attempt (e.g., a health probe against a
//! backend) and remembers its outcome across calls. Callers trigger it as
//! often as they like; the retrier decides whether an attempt actually runs.
//!
//! # States
//!
//! - [`RetryStatus::Disconnected`]: no attempt has been made yet.
//! - [`RetryStatus::Retrying`]: previous attempts failed, more are allowed.
//! - [`RetryStatus::Connected`]: an attempt succeeded; nothing else runs.
//! - [`RetryStatus::PermanentlyFailed`]: the attempt budget is exhausted.
//! - [`RetryStatus::Closed`]: the owner shut the resource down.
mod error;
mod retrier;

pub use error::{RetryError, RetryErrorKind};
pub use retrier::{Retrier, RetryStatus, RetryStrategy};
