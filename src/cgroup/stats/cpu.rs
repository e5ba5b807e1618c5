//! Parsers for `cpu.stat` and `cpu.max`.
//!
//! `cpu.stat` reports CPU times in microseconds; conversion into the
//! collector's tick unit happens in [`crate::metrics`], not here.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::LazyLock;

use super::parser::read_u64_or_max;
use super::{KeyValueStat, SingleLineStat};

/// Parsed data from a cgroup v2 `cpu.stat` file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CpuStat {
    /// Total CPU time (user + system) in microseconds.
    pub usage_usec: u64,
    pub user_usec: u64,
    pub system_usec: u64,
    pub nr_periods: u64,
    pub nr_throttled: u64,
    pub throttled_usec: u64,
}

type Setter = fn(&mut CpuStat, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(6);

    m.insert("usage_usec", |s, v| s.usage_usec = v);
    m.insert("user_usec", |s, v| s.user_usec = v);
    m.insert("system_usec", |s, v| s.system_usec = v);
    m.insert("nr_periods", |s, v| s.nr_periods = v);
    m.insert("nr_throttled", |s, v| s.nr_throttled = v);
    m.insert("throttled_usec", |s, v| s.throttled_usec = v);

    m
});

impl KeyValueStat for CpuStat {
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

const DEFAULT_PERIOD: u64 = 100_000;

/// CPU bandwidth limit from `cpu.max` (`<quota> <period>` or `max <period>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuLimit {
    /// Allowed CPU time per period in microseconds; `None` means unlimited.
    pub quota: Option<u64>,
    /// Enforcement period in microseconds.
    pub period: u64,
}

impl Default for CpuLimit {
    fn default() -> Self {
        Self {
            quota: None,
            period: DEFAULT_PERIOD,
        }
    }
}

impl CpuLimit {
    /// The limit as a percentage of one CPU, or `None` if unlimited.
    pub fn percent(&self) -> Option<f64> {
        let quota = self.quota?;
        if self.period == 0 {
            return None;
        }
        Some(quota as f64 / self.period as f64 * 100.0)
    }
}

impl SingleLineStat for CpuLimit {
    /// A missing or unparsable period falls back to 100ms.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        let mut parts = line.split_whitespace();
        let quota = read_u64_or_max(&mut parts.next().unwrap_or("max").as_bytes())?;
        let period = parts
            .next()
            .and_then(|p| p.parse::<u64>().ok())
            .unwrap_or(DEFAULT_PERIOD);

        Ok(CpuLimit { quota, period })
    }
}
