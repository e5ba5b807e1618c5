use crate::retry::RetryError;
use crate::{cgroup, garden};

/// Failure to obtain a snapshot at all.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to scrape cgroups: {0}")]
    Cgroup(#[from] cgroup::Error),
    #[error("failed to fetch garden metrics: {0}")]
    Garden(#[from] garden::Error),
    #[error("garden connection unavailable: {0}")]
    Connection(#[from] RetryError),
}

/// Failure to derive usage from one snapshot entry.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Cgroup(#[from] cgroup::Error),
    #[error("backend reported an error: {0}")]
    Backend(String),
}
