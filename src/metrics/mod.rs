//! Resource usage snapshots and their correlation with container records.
//!
//! A [`SnapshotSource`] yields raw, runtime-native usage per container
//! handle. [`correlate`] normalizes those entries into [`ContainerUsage`]
//! and attaches them to the active records of a pass.
mod correlate;
mod error;
mod garden;
mod source;
mod usage;

pub use correlate::correlate;
pub use error::{NormalizeError, SnapshotError};
pub use garden::GardenMetricsSource;
pub use source::{AnySnapshotSource, RawUsage, Snapshot, SnapshotSource};
pub use usage::{
    ContainerMetrics, ContainerUsage, CpuTimes, InterfaceNetStats, MICROS_PER_TICK,
    MemoryCounters, NANOS_PER_TICK, ResourceLimits, TICKS_PER_SECOND,
};
