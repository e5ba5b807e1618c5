use crate::garden;
use crate::metrics::SnapshotError;
use crate::retry::RetryError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Connection(#[from] RetryError),
    #[error("failed to list containers: {0}")]
    Listing(#[source] garden::Error),
    #[error("failed to look up container: {0}")]
    Lookup(#[source] garden::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("tag output channel is closed")]
    OutputClosed,
    #[error("entity `{0}` not found")]
    NotFound(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Returns `true` for connection errors that may clear up on a later call.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connection(err) => err.is_retryable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
