//! Environment driven configuration.
//!
//! | Variable                    | Default                              |
//! |-----------------------------|--------------------------------------|
//! | `GARDEN_NETWORK`            | `unix`                               |
//! | `GARDEN_ADDRESS`            | `/var/vcap/data/garden/garden.sock`  |
//! | `GARDEN_POLL_INTERVAL_SECS` | `15`                                 |
//! | `GARDEN_RETRY_COUNT`        | `10`                                 |
//! | `GARDEN_RETRY_DELAY_SECS`   | `30`                                 |
//! | `GARDEN_METRICS_SOURCE`     | `cgroup` (or `garden`)               |
//! | `CGROUP_ROOT`               | `/sys/fs/cgroup`                     |
//! | `CGROUP_PREFIX`             | `garden`                             |
//! | `PROC_ROOT`                 | `/proc`                              |
//! | `TAGGER_CHANNEL_CAPACITY`   | `16`                                 |
//!
//! Both `*_SECS` durations are capped at [`MAX_DURATION_SECS`].
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::garden::{DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY, DEFAULT_SOCKET_PATH};
use crate::retry::RetryStrategy;
use crate::tagger::DEFAULT_POLL_INTERVAL;

/// Upper bound for the `*_SECS` variables: one day.
pub const MAX_DURATION_SECS: u64 = 86_400;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported garden network `{0}`, only `unix` is supported")]
    UnsupportedNetwork(String),
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Where container usage is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsSourceKind {
    /// cgroup v2 files below [`Config::cgroup_parent`].
    Cgroup,
    /// Garden's `bulk_metrics` endpoint.
    Garden,
}

impl FromStr for MetricsSourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cgroup" => Ok(MetricsSourceKind::Cgroup),
            "garden" => Ok(MetricsSourceKind::Garden),
            other => Err(format!("unknown metrics source `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub socket_path: PathBuf,
    pub poll_interval: Duration,
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub metrics_source: MetricsSourceKind,
    pub cgroup_root: PathBuf,
    pub cgroup_prefix: String,
    pub proc_root: PathBuf,
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            metrics_source: MetricsSourceKind::Cgroup,
            cgroup_root: PathBuf::from("/sys/fs/cgroup"),
            cgroup_prefix: "garden".to_owned(),
            proc_root: PathBuf::from("/proc"),
            channel_capacity: 16,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to the defaults
    /// for unset variables.
    ///
    /// # Errors
    ///
    /// Fails on a network other than `unix`, on values that do not parse and
    /// on durations above [`MAX_DURATION_SECS`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(network) = lookup("GARDEN_NETWORK") {
            if network != "unix" {
                return Err(Error::UnsupportedNetwork(network));
            }
        }
        if let Some(address) = lookup("GARDEN_ADDRESS") {
            config.socket_path = PathBuf::from(address);
        }
        if let Some(interval) = parse_secs(&lookup, "GARDEN_POLL_INTERVAL_SECS")? {
            config.poll_interval = interval;
        }
        if let Some(count) = parse::<u32>(&lookup, "GARDEN_RETRY_COUNT")? {
            config.retry_count = count;
        }
        if let Some(delay) = parse_secs(&lookup, "GARDEN_RETRY_DELAY_SECS")? {
            config.retry_delay = delay;
        }
        if let Some(kind) = parse::<MetricsSourceKind>(&lookup, "GARDEN_METRICS_SOURCE")? {
            config.metrics_source = kind;
        }
        if let Some(root) = lookup("CGROUP_ROOT") {
            config.cgroup_root = PathBuf::from(root);
        }
        if let Some(prefix) = lookup("CGROUP_PREFIX") {
            config.cgroup_prefix = prefix;
        }
        if let Some(root) = lookup("PROC_ROOT") {
            config.proc_root = PathBuf::from(root);
        }
        if let Some(capacity) = parse::<usize>(&lookup, "TAGGER_CHANNEL_CAPACITY")? {
            if capacity == 0 {
                return Err(Error::Invalid {
                    key: "TAGGER_CHANNEL_CAPACITY",
                    value: capacity.to_string(),
                    reason: "must be greater than zero".to_owned(),
                });
            }
            config.channel_capacity = capacity;
        }

        Ok(config)
    }

    /// Parent cgroup holding one directory per container handle.
    pub fn cgroup_parent(&self) -> PathBuf {
        self.cgroup_root.join(&self.cgroup_prefix)
    }

    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy::RetryCount {
            count: self.retry_count,
            delay: self.retry_delay,
        }
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value.trim().parse().map(Some).map_err(|err: T::Err| Error::Invalid {
        key,
        reason: err.to_string(),
        value,
    })
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>> {
    let Some(secs) = parse::<u64>(lookup, key)? else {
        return Ok(None);
    };
    if secs > MAX_DURATION_SECS {
        return Err(Error::Invalid {
            key,
            value: secs.to_string(),
            reason: format!("must be at most {MAX_DURATION_SECS} seconds"),
        });
    }
    Ok(Some(Duration::from_secs(secs)))
}
