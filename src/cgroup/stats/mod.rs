//! Parsers for cgroup v2 and procfs stat files.
//!
//! Each parser reads from any [`std::io::BufRead`] and reports malformed
//! content as [`std::io::ErrorKind::InvalidData`] wrapping a [`StatParseError`].
//!
//! # Examples
//!
//! ```rust
//! use garden_tagger::cgroup::stats::{CpuStat, KeyValueStat, MemoryLimit, SingleLineStat};
//!
//! let cpu = CpuStat::from_reader(&mut "usage_usec 20000\nuser_usec 15000\n".as_bytes()).unwrap();
//! assert_eq!(cpu.user_usec, 15000);
//!
//! let limit = MemoryLimit::from_reader(&mut "max\n".as_bytes()).unwrap();
//! assert_eq!(limit.limit_bytes, None);
//! ```

mod cpu;
mod error;
mod memory;
mod net;
mod parser;

pub use cpu::{CpuLimit, CpuStat};
pub use error::StatParseError;
pub use memory::{MemoryLimit, MemoryStat, MemoryUsage};
pub use net::{InterfaceStat, NetworkStat};
pub use parser::{KeyValueStat, SingleLineStat};
