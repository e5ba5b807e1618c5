use std::collections::{HashMap, HashSet};

use crate::cgroup::{CgroupDir, CgroupScraper};
use crate::garden::GardenApi;
use crate::garden::models::ContainerMetricsEntry;

use super::garden::{GardenMetricsSource, normalize_garden};
use super::{ContainerUsage, NormalizeError, SnapshotError};

/// Runtime-native usage of one container, prior to normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawUsage {
    /// The container's cgroup; files are read on normalization.
    Cgroup(CgroupDir),
    Garden(Box<ContainerMetricsEntry>),
}

impl RawUsage {
    /// Converts the raw entry into limits and metrics in common units.
    ///
    /// # Errors
    ///
    /// Fails if cgroup files are missing or malformed, or if the backend
    /// reported an error for this container.
    pub fn normalize(&self) -> Result<ContainerUsage, NormalizeError> {
        match self {
            RawUsage::Cgroup(dir) => Ok(dir.read_usage()?),
            RawUsage::Garden(entry) => normalize_garden(entry),
        }
    }
}

/// Raw usage keyed by container handle.
pub type Snapshot = HashMap<String, RawUsage>;

/// Produces a [`Snapshot`] for a set of container handles.
pub trait SnapshotSource: Send + Sync {
    /// Entries may be missing for some of the requested `handles`.
    fn snapshot(
        &self,
        handles: &[String],
    ) -> impl Future<Output = Result<Snapshot, SnapshotError>> + Send;
}

impl SnapshotSource for CgroupScraper {
    async fn snapshot(&self, handles: &[String]) -> Result<Snapshot, SnapshotError> {
        let wanted: HashSet<&str> = handles.iter().map(String::as_str).collect();
        Ok(self
            .scrape()?
            .into_iter()
            .filter(|(handle, _)| wanted.contains(handle.as_str()))
            .map(|(handle, dir)| (handle, RawUsage::Cgroup(dir)))
            .collect())
    }
}

/// Snapshot source selected at runtime.
#[derive(Debug)]
pub enum AnySnapshotSource<C> {
    Cgroup(CgroupScraper),
    Garden(GardenMetricsSource<C>),
}

impl<C: GardenApi> SnapshotSource for AnySnapshotSource<C> {
    async fn snapshot(&self, handles: &[String]) -> Result<Snapshot, SnapshotError> {
        match self {
            AnySnapshotSource::Cgroup(source) => source.snapshot(handles).await,
            AnySnapshotSource::Garden(source) => source.snapshot(handles).await,
        }
    }
}
