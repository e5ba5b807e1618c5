use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::fsutil;
use crate::metrics::{
    ContainerMetrics, ContainerUsage, CpuTimes, InterfaceNetStats, MemoryCounters, ResourceLimits,
};

use super::stats::{
    CpuLimit, CpuStat, KeyValueStat, MemoryLimit, MemoryStat, MemoryUsage, NetworkStat,
    SingleLineStat, StatParseError,
};
use super::{Error, Result};

/// Lists the per-container cgroups below one parent directory.
#[derive(Debug, Clone)]
pub struct CgroupScraper {
    root: PathBuf,
    proc_root: PathBuf,
}

impl CgroupScraper {
    /// # Arguments
    ///
    /// * `root` - Parent cgroup containing one directory per container handle.
    /// * `proc_root` - Mount point of procfs, used for network counters.
    pub fn new(root: impl Into<PathBuf>, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            proc_root: proc_root.into(),
        }
    }

    /// Returns one [`CgroupDir`] per child directory of the root, keyed by directory name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadDir`] if the root cannot be listed. Unreadable
    /// individual entries are logged and left out.
    pub fn scrape(&self) -> Result<HashMap<String, CgroupDir>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| Error::ReadDir {
            path: self.root.clone(),
            source,
        })?;

        let mut out = HashMap::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::debug!("skipping unreadable entry in `{}`: {}", self.root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_ok_and(|t| t.is_dir()) {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            out.insert(
                name,
                CgroupDir {
                    path: entry.path(),
                    proc_root: self.proc_root.clone(),
                },
            );
        }
        log::trace!("found {} cgroups below `{}`", out.len(), self.root.display());

        Ok(out)
    }
}

/// The cgroup of a single container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupDir {
    path: PathBuf,
    proc_root: PathBuf,
}

impl CgroupDir {
    pub fn new(path: impl Into<PathBuf>, proc_root: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            proc_root: proc_root.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads limits and metrics of this cgroup.
    ///
    /// # Errors
    ///
    /// Fails if `cpu.stat` or `memory.current` is missing, or if any file that
    /// exists cannot be read or parsed.
    pub fn read_usage(&self) -> Result<ContainerUsage> {
        let cpu = read_required(&self.path.join("cpu.stat"), CpuStat::from_reader)?;
        let usage = read_required(&self.path.join("memory.current"), MemoryUsage::from_reader)?;
        let memory_stat =
            read_optional(&self.path.join("memory.stat"), MemoryStat::from_reader)?
                .unwrap_or_default();
        let swap = read_optional(&self.path.join("memory.swap.current"), MemoryUsage::from_reader)?;
        let cpu_limit = read_optional(&self.path.join("cpu.max"), CpuLimit::from_reader)?;
        let memory_limit = read_optional(&self.path.join("memory.max"), MemoryLimit::from_reader)?;

        Ok(ContainerUsage {
            limits: ResourceLimits {
                cpu_limit: cpu_limit.and_then(|l| l.percent()),
                memory_limit: memory_limit.and_then(|l| l.limit_bytes),
            },
            metrics: ContainerMetrics {
                cpu: CpuTimes::from_micros(cpu.user_usec, cpu.system_usec, cpu.usage_usec),
                memory: MemoryCounters {
                    rss: memory_stat.anon,
                    cache: memory_stat.file,
                    mapped_file: memory_stat.file_mapped,
                    shmem: memory_stat.shmem,
                    swap: swap.map(|s| s.usage_bytes),
                    active_anon: memory_stat.active_anon,
                    inactive_anon: memory_stat.inactive_anon,
                    active_file: memory_stat.active_file,
                    inactive_file: memory_stat.inactive_file,
                    unevictable: memory_stat.unevictable,
                    pgfault: memory_stat.pgfault,
                    pgmajfault: memory_stat.pgmajfault,
                    usage: usage.usage_bytes,
                },
                network: self.read_network()?,
            },
        })
    }

    /// Network counters of the namespace of the first process in the cgroup.
    fn read_network(&self) -> Result<Vec<InterfaceNetStats>> {
        let Some(pid) = read_optional(&self.path.join("cgroup.procs"), first_pid)?.flatten() else {
            return Ok(Vec::new());
        };
        let path = self.proc_root.join(pid.to_string()).join("net/dev");
        let stat = read_optional(&path, NetworkStat::from_reader)?.unwrap_or_default();

        Ok(stat
            .interfaces
            .into_iter()
            .map(|iface| InterfaceNetStats {
                name: iface.name,
                bytes_sent: iface.tx_bytes,
                bytes_rcvd: iface.rx_bytes,
                packets_sent: iface.tx_packets,
                packets_rcvd: iface.rx_packets,
            })
            .collect())
    }
}

fn read_required<T>(
    path: &Path,
    reader: impl FnOnce(&mut BufReader<File>) -> std::io::Result<T>,
) -> Result<T> {
    let mut buf = fsutil::open_file_reader(path)?;
    reader(&mut buf).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional<T>(
    path: &Path,
    reader: impl FnOnce(&mut BufReader<File>) -> std::io::Result<T>,
) -> Result<Option<T>> {
    match fsutil::open_optional_file_reader(path)? {
        Some(mut buf) => reader(&mut buf).map(Some).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(None),
    }
}

/// Parses the first pid of a `cgroup.procs` file; `None` for an empty cgroup.
fn first_pid<R: BufRead>(buf: &mut R) -> std::io::Result<Option<u32>> {
    let mut line = String::new();
    buf.read_line(&mut line)?;
    let value = line.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<u32>().map(Some).map_err(|source| {
        StatParseError::InvalidPid {
            value: value.to_owned(),
            source,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn container_cgroup(root: &Path, handle: &str) -> PathBuf {
        let dir = root.join(handle);
        write(&dir, "cpu.stat", "usage_usec 2000000\nuser_usec 1500000\nsystem_usec 500000\n");
        write(&dir, "memory.current", "4096\n");
        dir
    }

    #[test]
    fn test_scrape_lists_directories_only() {
        let tmp = tempfile::tempdir().unwrap();
        container_cgroup(tmp.path(), "a");
        container_cgroup(tmp.path(), "b");
        write(tmp.path(), "cgroup.procs", "");

        let scraper = CgroupScraper::new(tmp.path(), "/proc");
        let dirs = scraper.scrape().unwrap();
        let mut names: Vec<_> = dirs.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(dirs["a"].path(), tmp.path().join("a"));
    }

    #[test]
    fn test_scrape_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let scraper = CgroupScraper::new(tmp.path().join("garden"), "/proc");
        assert!(matches!(scraper.scrape(), Err(Error::ReadDir { .. })));
    }

    #[test]
    fn test_read_minimal_usage() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = container_cgroup(tmp.path(), "a");

        let usage = CgroupDir::new(dir, tmp.path().join("proc")).read_usage().unwrap();
        assert_eq!(
            usage.metrics.cpu,
            CpuTimes {
                user: 150,
                system: 50,
                usage: 200,
            }
        );
        assert_eq!(usage.metrics.memory.usage, 4096);
        assert_eq!(usage.metrics.memory.swap, None);
        assert!(usage.metrics.network.is_empty());
        assert_eq!(usage.limits, ResourceLimits::default());
    }

    #[test]
    fn test_read_full_usage() {
        let tmp = tempfile::tempdir().unwrap();
        let proc_root = tmp.path().join("proc");
        let dir = container_cgroup(tmp.path(), "a");
        write(&dir, "cpu.max", "150000 100000\n");
        write(&dir, "memory.max", "1073741824\n");
        write(&dir, "memory.swap.current", "0\n");
        write(&dir, "memory.stat", "anon 1024\nfile 2048\npgfault 7\n");
        write(&dir, "cgroup.procs", "4242\n4243\n");
        write(
            &proc_root,
            "4242/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0
  eth0: 100 2 0 0 0 0 0 0 300 4 0 0 0 0 0 0
",
        );

        let usage = CgroupDir::new(dir, &proc_root).read_usage().unwrap();
        assert_eq!(usage.limits.cpu_limit, Some(150.0));
        assert_eq!(usage.limits.memory_limit, Some(1_073_741_824));
        assert_eq!(usage.metrics.memory.rss, 1024);
        assert_eq!(usage.metrics.memory.cache, 2048);
        assert_eq!(usage.metrics.memory.pgfault, 7);
        assert_eq!(usage.metrics.memory.swap, Some(0));
        assert_eq!(
            usage.metrics.network,
            vec![InterfaceNetStats {
                name: "eth0".to_owned(),
                bytes_sent: 300,
                bytes_rcvd: 100,
                packets_sent: 4,
                packets_rcvd: 2,
            }]
        );
    }

    #[test]
    fn test_missing_required_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a");
        write(&dir, "memory.current", "4096\n");

        let err = CgroupDir::new(dir, "/proc").read_usage().unwrap_err();
        assert!(matches!(err, Error::FileOpen(_)));
    }

    #[test]
    fn test_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = container_cgroup(tmp.path(), "a");
        write(&dir, "memory.max", "unlimited\n");

        let err = CgroupDir::new(dir, "/proc").read_usage().unwrap_err();
        match err {
            Error::Read { path, source } => {
                assert!(path.ends_with("memory.max"));
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_cgroup_has_no_network() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = container_cgroup(tmp.path(), "a");
        write(&dir, "cgroup.procs", "");

        let usage = CgroupDir::new(dir, "/proc").read_usage().unwrap();
        assert!(usage.metrics.network.is_empty());
    }
}
