use std::sync::Arc;

use crate::garden::models::ContainerMetricsEntry;
use crate::garden::{ConnectionService, GardenApi};

use super::{
    ContainerMetrics, ContainerUsage, CpuTimes, InterfaceNetStats, MemoryCounters,
    NormalizeError, RawUsage, ResourceLimits, Snapshot, SnapshotError, SnapshotSource,
};

/// Garden does not report per-interface counters.
const GARDEN_INTERFACE: &str = "default";

/// Reads usage through Garden's `bulk_metrics` endpoint.
#[derive(Debug)]
pub struct GardenMetricsSource<C> {
    connection: Arc<ConnectionService<C>>,
}

impl<C> GardenMetricsSource<C> {
    pub fn new(connection: Arc<ConnectionService<C>>) -> Self {
        Self { connection }
    }
}

impl<C: GardenApi> SnapshotSource for GardenMetricsSource<C> {
    async fn snapshot(&self, handles: &[String]) -> Result<Snapshot, SnapshotError> {
        let client = self.connection.acquire().await?;
        let entries = client.bulk_metrics(handles).await?;

        Ok(entries
            .into_iter()
            .map(|(handle, entry)| (handle, RawUsage::Garden(Box::new(entry))))
            .collect())
    }
}

pub(super) fn normalize_garden(
    entry: &ContainerMetricsEntry,
) -> Result<ContainerUsage, NormalizeError> {
    if let Some(err) = &entry.err {
        return Err(NormalizeError::Backend(err.message.clone()));
    }
    let memory = &entry.metrics.memory_stat;
    let cpu = &entry.metrics.cpu_stat;

    Ok(ContainerUsage {
        limits: ResourceLimits {
            cpu_limit: None,
            memory_limit: (memory.hierarchical_memory_limit > 0)
                .then_some(memory.hierarchical_memory_limit),
        },
        metrics: ContainerMetrics {
            cpu: CpuTimes::from_nanos(cpu.user, cpu.system, cpu.usage),
            memory: MemoryCounters {
                rss: memory.rss,
                cache: memory.cache,
                mapped_file: memory.mapped_file,
                shmem: 0,
                swap: Some(memory.swap),
                active_anon: memory.active_anon,
                inactive_anon: memory.inactive_anon,
                active_file: memory.active_file,
                inactive_file: memory.inactive_file,
                unevictable: memory.unevictable,
                pgfault: memory.pgfault,
                pgmajfault: memory.pgmajfault,
                usage: memory.total_usage_toward_limit,
            },
            network: entry
                .metrics
                .network_stat
                .map(|net| {
                    vec![InterfaceNetStats {
                        name: GARDEN_INTERFACE.to_owned(),
                        bytes_sent: net.tx_bytes,
                        bytes_rcvd: net.rx_bytes,
                        packets_sent: 0,
                        packets_rcvd: 0,
                    }]
                })
                .unwrap_or_default(),
        },
    })
}
