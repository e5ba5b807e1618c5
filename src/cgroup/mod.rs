//! Resource snapshots read from the cgroup v2 filesystem.
//!
//! Garden places every container in a cgroup named after its handle below a
//! common parent (by default `/sys/fs/cgroup/garden`). [`CgroupScraper`]
//! lists that parent once per pass; each resulting [`CgroupDir`] is read
//! lazily when its container is correlated.
//!
//! # Files read per container
//!
//! - `cpu.stat` (required) and `cpu.max`
//! - `memory.current` (required), `memory.stat`, `memory.max` and `memory.swap.current`
//! - `cgroup.procs`, whose first pid selects `/proc/<pid>/net/dev`
mod error;
mod scrape;
pub mod stats;

pub use error::{Error, Result};
pub use scrape::{CgroupDir, CgroupScraper};
