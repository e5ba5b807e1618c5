//! Parsers for `memory.stat`, `memory.current` (also `memory.swap.current`) and `memory.max`.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::LazyLock;

use super::parser::read_u64_or_max;
use super::{KeyValueStat, SingleLineStat, StatParseError};

/// Memory counters from a cgroup v2 `memory.stat` file, in bytes unless noted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryStat {
    pub anon: u64,
    pub file: u64,
    pub file_mapped: u64,
    pub shmem: u64,
    pub active_anon: u64,
    pub inactive_anon: u64,
    pub active_file: u64,
    pub inactive_file: u64,
    pub unevictable: u64,
    /// Page fault count.
    pub pgfault: u64,
    /// Major page fault count.
    pub pgmajfault: u64,
}

type Setter = fn(&mut MemoryStat, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(11);

    m.insert("anon", |s, v| s.anon = v);
    m.insert("file", |s, v| s.file = v);
    m.insert("file_mapped", |s, v| s.file_mapped = v);
    m.insert("shmem", |s, v| s.shmem = v);
    m.insert("active_anon", |s, v| s.active_anon = v);
    m.insert("inactive_anon", |s, v| s.inactive_anon = v);
    m.insert("active_file", |s, v| s.active_file = v);
    m.insert("inactive_file", |s, v| s.inactive_file = v);
    m.insert("unevictable", |s, v| s.unevictable = v);
    m.insert("pgfault", |s, v| s.pgfault = v);
    m.insert("pgmajfault", |s, v| s.pgmajfault = v);

    m
});

impl KeyValueStat for MemoryStat {
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}

/// A byte counter from `memory.current` or `memory.swap.current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryUsage {
    pub usage_bytes: u64,
}

impl SingleLineStat for MemoryUsage {
    /// # Errors
    ///
    /// Fails with [`std::io::ErrorKind::InvalidData`] unless the line is a `u64`.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut line = String::new();
        buf.read_line(&mut line)?;
        let line = line.trim();
        let usage_bytes = line
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidValue {
                value: line.to_string(),
                line: 1,
                source,
            })?;

        Ok(MemoryUsage { usage_bytes })
    }
}

/// Memory limit from `memory.max`; `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryLimit {
    pub limit_bytes: Option<u64>,
}

impl SingleLineStat for MemoryLimit {
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        Ok(MemoryLimit {
            limit_bytes: read_u64_or_max(buf)?,
        })
    }
}
