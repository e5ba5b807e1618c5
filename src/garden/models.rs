//! Wire models of the Garden HTTP API.
//!
//! Field names follow the JSON emitted by the Garden server; only the
//! fields this collector reads are modeled, everything else is ignored.
use std::collections::HashMap;

use serde::Deserialize;

/// Error payload returned by the server, either as a response body or
/// embedded in a bulk entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GardenError {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Message")]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct ContainersResponse {
    #[serde(rename = "Handles", default)]
    pub handles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PortMapping {
    #[serde(rename = "HostPort")]
    pub host_port: u32,
    #[serde(rename = "ContainerPort")]
    pub container_port: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerInfo {
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Events")]
    pub events: Vec<String>,
    #[serde(rename = "HostIP")]
    pub host_ip: String,
    #[serde(rename = "ContainerIP")]
    pub container_ip: String,
    #[serde(rename = "ExternalIP")]
    pub external_ip: String,
    #[serde(rename = "ContainerPath")]
    pub container_path: String,
    #[serde(rename = "ProcessIDs")]
    pub process_ids: Vec<String>,
    #[serde(rename = "Properties")]
    pub properties: HashMap<String, String>,
    #[serde(rename = "MappedPorts")]
    pub mapped_ports: Vec<PortMapping>,
}

/// One entry of a `bulk_info` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerInfoEntry {
    #[serde(rename = "Info")]
    pub info: ContainerInfo,
    #[serde(rename = "Err")]
    pub err: Option<GardenError>,
}

/// Memory counters as reported by Garden, in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MemoryStat {
    pub cache: u64,
    pub rss: u64,
    pub mapped_file: u64,
    pub pgpgin: u64,
    pub pgpgout: u64,
    pub swap: u64,
    pub pgfault: u64,
    pub pgmajfault: u64,
    pub inactive_anon: u64,
    pub active_anon: u64,
    pub inactive_file: u64,
    pub active_file: u64,
    pub unevictable: u64,
    pub hierarchical_memory_limit: u64,
    pub hierarchical_memsw_limit: u64,
    pub total_usage_toward_limit: u64,
}

/// CPU times in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CpuStat {
    pub usage: u64,
    pub user: u64,
    pub system: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct NetworkStat {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metrics {
    #[serde(rename = "MemoryStat")]
    pub memory_stat: MemoryStat,
    #[serde(rename = "CPUStat")]
    pub cpu_stat: CpuStat,
    #[serde(rename = "NetworkStat")]
    pub network_stat: Option<NetworkStat>,
}

/// One entry of a `bulk_metrics` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerMetricsEntry {
    #[serde(rename = "Metrics")]
    pub metrics: Metrics,
    #[serde(rename = "Err")]
    pub err: Option<GardenError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bulk_info() {
        let body = r#"{
            "a": {
                "Info": {
                    "State": "active",
                    "ExternalIP": "10.0.0.5",
                    "ProcessIDs": ["1"],
                    "MappedPorts": [{"HostPort": 61001, "ContainerPort": 8080}]
                },
                "Err": null
            },
            "b": {"Info": {}, "Err": {"Type": "ContainerNotFoundError", "Message": "unknown handle: b"}}
        }"#;
        let entries: HashMap<String, ContainerInfoEntry> = serde_json::from_str(body).unwrap();

        let a = &entries["a"];
        assert_eq!(a.err, None);
        assert_eq!(a.info.state, "active");
        assert_eq!(a.info.external_ip, "10.0.0.5");
        assert_eq!(
            a.info.mapped_ports,
            vec![PortMapping {
                host_port: 61001,
                container_port: 8080,
            }]
        );

        let b = &entries["b"];
        assert_eq!(b.err.as_ref().unwrap().message, "unknown handle: b");
    }

    #[test]
    fn test_decode_bulk_metrics() {
        let body = r#"{
            "a": {
                "Metrics": {
                    "MemoryStat": {"Rss": 10, "Cache": 20, "TotalUsageTowardLimit": 30, "HierarchicalMemoryLimit": 40},
                    "CPUStat": {"Usage": 3000000000, "User": 2000000000, "System": 1000000000},
                    "NetworkStat": {"RxBytes": 5, "TxBytes": 6},
                    "DiskStat": {"TotalBytesUsed": 1}
                }
            }
        }"#;
        let entries: HashMap<String, ContainerMetricsEntry> = serde_json::from_str(body).unwrap();
        let metrics = &entries["a"].metrics;
        assert_eq!(metrics.memory_stat.rss, 10);
        assert_eq!(metrics.memory_stat.total_usage_toward_limit, 30);
        assert_eq!(metrics.cpu_stat.usage, 3_000_000_000);
        assert_eq!(
            metrics.network_stat,
            Some(NetworkStat {
                rx_bytes: 5,
                tx_bytes: 6,
            })
        );
    }
}
