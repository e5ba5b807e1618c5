use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::container::{build_entity_id, handle_for_entity, short_id};
use crate::garden::{self, ConnectionService, GardenApi};
use crate::metrics::{SnapshotSource, correlate};

use super::{
    CollectionMode, Collector, EntityTags, Error, PollScheduler, PullOutcome, Result, TagInfo,
};

/// Minimum time between two pulls that reach the backend.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Collects container tags from a local Garden server.
#[derive(Debug)]
pub struct GardenCollector<C, S> {
    connection: Arc<ConnectionService<C>>,
    source: S,
    scheduler: PollScheduler,
    output: mpsc::Sender<Vec<TagInfo>>,
}

impl<C, S> GardenCollector<C, S>
where
    C: GardenApi,
    S: SnapshotSource,
{
    pub fn new(
        connection: Arc<ConnectionService<C>>,
        source: S,
        output: mpsc::Sender<Vec<TagInfo>>,
    ) -> Self {
        Self {
            connection,
            source,
            scheduler: PollScheduler::new(DEFAULT_POLL_INTERVAL),
            output,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.scheduler = PollScheduler::new(interval);
        self
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Runs one pass as if the current time were `now`.
    ///
    /// Lists all containers, attaches usage to the active ones and publishes
    /// one batch with a record per listed container. The poll timestamp only
    /// advances once the batch was handed to the channel.
    ///
    /// # Errors
    ///
    /// Fails, without advancing the poll timestamp, if the connection is
    /// unavailable, listing or the snapshot fails, or the channel is closed.
    pub async fn pull_at(&self, now: Instant) -> Result<PullOutcome> {
        if let Some(next_in) = self.scheduler.throttle(now) {
            log::trace!("skipping pull, next effective pull in {:?}", next_in);
            return Ok(PullOutcome::Throttled { next_in });
        }

        let client = self.connection.acquire().await?;
        let garden::Listing {
            mut records,
            mut skipped,
        } = garden::list(client.as_ref()).await.map_err(Error::Listing)?;

        let handles: Vec<String> = records.iter().map(|r| r.id().to_string()).collect();
        let snapshot = self.source.snapshot(&handles).await?;
        skipped.extend(correlate(&mut records, &snapshot));

        let batch: Vec<TagInfo> = records
            .into_iter()
            .map(|record| TagInfo::from_record(record, false))
            .collect();
        let published = batch.len();
        self.publish(batch).await?;
        self.scheduler.mark_updated(now);
        log::debug!("published tags of {} containers, skipped {}", published, skipped.len());

        Ok(PullOutcome::Published { published, skipped })
    }

    async fn publish(&self, batch: Vec<TagInfo>) -> Result<()> {
        self.output.send(batch).await.map_err(|_| Error::OutputClosed)
    }
}

impl<C, S> Collector for GardenCollector<C, S>
where
    C: GardenApi,
    S: SnapshotSource,
{
    async fn detect(&self) -> Result<CollectionMode> {
        match self.connection.acquire().await {
            Ok(_) => Ok(CollectionMode::Pull),
            Err(err) => {
                if err.is_retryable() {
                    log::warn!("could not connect to the local garden server: {}", err);
                } else {
                    log::error!("permanent failure connecting to the local garden server: {}", err);
                }
                Err(err.into())
            }
        }
    }

    async fn pull(&self) -> Result<PullOutcome> {
        self.pull_at(Instant::now()).await
    }

    async fn fetch(&self, entity: &str) -> Result<EntityTags> {
        let handle = handle_for_entity(entity);
        if handle.is_empty() {
            self.publish(vec![TagInfo::unmatched(handle)]).await?;
            return Err(Error::NotFound(entity.to_owned()));
        }

        let client = self.connection.acquire().await?;
        let handles = vec![handle.to_owned()];
        let entries = client.bulk_info(&handles).await.map_err(Error::Lookup)?;
        let (info, found) = match garden::build_listing(&handles, entries).records.pop() {
            Some(record) => (TagInfo::from_record(record, true), true),
            None => {
                log::debug!("container `{}` not found", short_id(handle));
                (TagInfo::unmatched(handle), false)
            }
        };

        let tags = found.then(|| info.tags());
        self.publish(vec![info]).await?;

        tags.ok_or_else(|| Error::NotFound(entity.to_owned()))
    }
}
