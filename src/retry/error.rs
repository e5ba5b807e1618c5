use std::fmt;

/// Whether a failed [`Retrier`](super::Retrier) trigger may succeed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorKind {
    /// Attempts remain; trigger again later.
    WillRetry,
    /// The attempt budget is exhausted or the resource was closed.
    PermaFail,
}

impl fmt::Display for RetryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryErrorKind::WillRetry => f.write_str("temporary failure, will retry later"),
            RetryErrorKind::PermaFail => f.write_str("permanent failure"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{name}: {kind} ({message})")]
pub struct RetryError {
    name: String,
    kind: RetryErrorKind,
    message: String,
}

impl RetryError {
    pub(super) fn new(name: &str, kind: RetryErrorKind, message: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> RetryErrorKind {
        self.kind
    }

    /// Returns `true` if a later trigger may still succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind == RetryErrorKind::WillRetry
    }

    /// The last error reported by the attempt, or the reason for the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}
