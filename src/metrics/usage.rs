//! Normalized resource usage attached to container records.
//!
//! CPU times are expressed in clock ticks of [`TICKS_PER_SECOND`] per second.
//! Every source converts its native unit with the integer divisors below, so
//! the same raw value always yields the same tick count.

/// Clock ticks per second (`USER_HZ`).
pub const TICKS_PER_SECOND: u64 = 100;
/// Nanoseconds per tick; Garden reports CPU times in nanoseconds.
pub const NANOS_PER_TICK: u64 = 1_000_000_000 / TICKS_PER_SECOND;
/// Microseconds per tick; cgroup v2 `cpu.stat` reports microseconds.
pub const MICROS_PER_TICK: u64 = 1_000_000 / TICKS_PER_SECOND;

/// Cumulative CPU times in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub user: u64,
    pub system: u64,
    /// Total usage, including time not attributed to user or system.
    pub usage: u64,
}

impl CpuTimes {
    pub fn from_nanos(user: u64, system: u64, usage: u64) -> Self {
        Self {
            user: user / NANOS_PER_TICK,
            system: system / NANOS_PER_TICK,
            usage: usage / NANOS_PER_TICK,
        }
    }

    pub fn from_micros(user: u64, system: u64, usage: u64) -> Self {
        Self {
            user: user / MICROS_PER_TICK,
            system: system / MICROS_PER_TICK,
            usage: usage / MICROS_PER_TICK,
        }
    }
}

/// Memory counters in bytes, except the page fault counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryCounters {
    pub rss: u64,
    pub cache: u64,
    pub mapped_file: u64,
    pub shmem: u64,
    /// `None` if the source does not account swap.
    pub swap: Option<u64>,
    pub active_anon: u64,
    pub inactive_anon: u64,
    pub active_file: u64,
    pub inactive_file: u64,
    pub unevictable: u64,
    pub pgfault: u64,
    pub pgmajfault: u64,
    /// Usage counted towards the memory limit.
    pub usage: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceNetStats {
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_rcvd: u64,
    pub packets_sent: u64,
    pub packets_rcvd: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerMetrics {
    pub cpu: CpuTimes,
    pub memory: MemoryCounters,
    pub network: Vec<InterfaceNetStats>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceLimits {
    /// Percent of one CPU; `None` if unlimited or unknown.
    pub cpu_limit: Option<f64>,
    /// Bytes; `None` if unlimited or unknown.
    pub memory_limit: Option<u64>,
}

/// Limits and metrics of one container, as produced by normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerUsage {
    pub limits: ResourceLimits,
    pub metrics: ContainerMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_divisors() {
        assert_eq!(NANOS_PER_TICK, 10_000_000);
        assert_eq!(MICROS_PER_TICK, 10_000);
    }

    #[test]
    fn test_nanos_and_micros_agree() {
        let nanos = CpuTimes::from_nanos(1_500_000_000, 250_000_000, 1_750_000_000);
        let micros = CpuTimes::from_micros(1_500_000, 250_000, 1_750_000);
        assert_eq!(nanos, micros);
        assert_eq!(
            nanos,
            CpuTimes {
                user: 150,
                system: 25,
                usage: 175,
            }
        );
    }

    #[test]
    fn test_conversion_truncates() {
        let t = CpuTimes::from_nanos(19_999_999, 9_999_999, 10_000_000);
        assert_eq!(t.user, 1);
        assert_eq!(t.system, 0);
        assert_eq!(t.usage, 1);
    }
}
