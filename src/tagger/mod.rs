//! Tag collection for Garden containers.
//!
//! A [`Collector`] is driven from outside: `detect` once (again while it
//! fails with a retryable error), then `pull` on any cadence and `fetch` on
//! demand. Both publish batches of [`TagInfo`] on a bounded channel. The send
//! blocks while the channel is full, so a stalled consumer stalls the
//! collector.
mod error;
mod garden;
mod scheduler;

pub use error::{Error, Result};
pub use garden::{DEFAULT_POLL_INTERVAL, GardenCollector};
pub use scheduler::PollScheduler;

use crate::container::{ContainerRecord, build_entity_id};
use crate::metrics::ContainerUsage;

/// Source name attached to every published [`TagInfo`].
pub const SOURCE_NAME: &str = "garden";

/// How the collector wants to be driven after detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMode {
    NoCollection,
    Pull,
}

/// Result of a [`Collector::pull`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// The poll interval has not elapsed; nothing was queried or published.
    Throttled { next_in: std::time::Duration },
    Published {
        published: usize,
        skipped: Vec<crate::container::Skipped>,
    },
}

/// The three cardinality tiers of an entity's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTags {
    pub low: Vec<String>,
    pub orchestrator: Vec<String>,
    pub high: Vec<String>,
}

/// One tag update for a downstream tag store.
#[derive(Debug, Clone, PartialEq)]
pub struct TagInfo {
    pub source: &'static str,
    pub entity: String,
    pub low_card_tags: Vec<String>,
    pub orchestrator_card_tags: Vec<String>,
    pub high_card_tags: Vec<String>,
    /// The entity no longer exists and should be purged.
    pub delete_entity: bool,
    /// Produced by a direct lookup rather than a poll.
    pub cache_miss: bool,
    pub usage: Option<ContainerUsage>,
}

impl TagInfo {
    pub(crate) fn from_record(record: ContainerRecord, cache_miss: bool) -> Self {
        Self {
            source: SOURCE_NAME,
            high_card_tags: vec![format!("container_name:{}", record.name())],
            usage: record.usage(),
            entity: record.entity_id().to_owned(),
            low_card_tags: Vec::new(),
            orchestrator_card_tags: Vec::new(),
            delete_entity: false,
            cache_miss,
        }
    }

    /// The attempted record for a handle no container could be built for.
    pub(crate) fn unmatched(handle: &str) -> Self {
        Self {
            source: SOURCE_NAME,
            entity: build_entity_id(handle),
            low_card_tags: Vec::new(),
            orchestrator_card_tags: Vec::new(),
            high_card_tags: vec![format!("container_name:{handle}")],
            delete_entity: false,
            cache_miss: true,
            usage: None,
        }
    }

    pub fn tags(&self) -> EntityTags {
        EntityTags {
            low: self.low_card_tags.clone(),
            orchestrator: self.orchestrator_card_tags.clone(),
            high: self.high_card_tags.clone(),
        }
    }
}

/// Lifecycle hooks of a tag collector.
pub trait Collector: Send + Sync {
    /// Checks whether the backend is reachable.
    ///
    /// A retryable error asks the caller to detect again later; any other
    /// error means [`CollectionMode::NoCollection`].
    fn detect(&self) -> impl Future<Output = Result<CollectionMode>> + Send;

    /// Publishes the tags of all containers, at most once per poll interval.
    fn pull(&self) -> impl Future<Output = Result<PullOutcome>> + Send;

    /// Resolves and publishes the tags of a single entity.
    ///
    /// Fails with [`Error::NotFound`] if the backend has no such container.
    fn fetch(&self, entity: &str) -> impl Future<Output = Result<EntityTags>> + Send;
}
