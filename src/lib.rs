//! Garden Tagger: container discovery and tag collection for a local Garden
//! (Cloud Foundry) container runtime.
//!
//! The library connects to the Garden API over its unix socket, lists the
//! containers on the host, correlates them with cgroup (or Garden) resource
//! usage and publishes tag records for a downstream tag store.
pub mod cgroup;
pub mod config;
pub mod container;
pub mod error;
pub mod fsutil;
pub mod garden;
pub mod metrics;
pub mod retry;
pub mod tagger;

use std::sync::Arc;
use std::time::Duration;

use config::{Config, MetricsSourceKind};
use error::ResultOkLogExt;
use garden::{ConnectionService, HttpGardenClient};
use metrics::{AnySnapshotSource, GardenMetricsSource};
use tagger::{CollectionMode, Collector, GardenCollector, PullOutcome, TagInfo};

/// How often the pull loop calls into the collector; the collector throttles
/// itself to its poll interval.
const PULL_TICK: Duration = Duration::from_secs(1);

/// Runs the Garden Tagger until interrupted.
///
/// Reads the configuration from the environment, waits for the Garden server
/// to become reachable and then pulls tags in a loop, logging every
/// published batch.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid configuration values.
/// - Garden server unreachable after the configured retry budget.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    log::debug!("Config: {:?}", config);

    let client = HttpGardenClient::new(&config.socket_path);
    let connection = Arc::new(ConnectionService::new(client, config.retry_strategy()));
    let source = match config.metrics_source {
        MetricsSourceKind::Cgroup => AnySnapshotSource::Cgroup(cgroup::CgroupScraper::new(
            config.cgroup_parent(),
            &config.proc_root,
        )),
        MetricsSourceKind::Garden => {
            AnySnapshotSource::Garden(GardenMetricsSource::new(Arc::clone(&connection)))
        }
    };

    let (tx, mut rx) = tokio::sync::mpsc::channel::<Vec<TagInfo>>(config.channel_capacity);
    tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            for info in &batch {
                log::info!(
                    "{} {} delete={} cache_miss={} high={:?}",
                    info.source,
                    info.entity,
                    info.delete_entity,
                    info.cache_miss,
                    info.high_card_tags
                );
            }
        }
    });

    let collector = GardenCollector::new(Arc::clone(&connection), source, tx)
        .with_poll_interval(config.poll_interval);

    let mode = tokio::select! {
        mode = detect(&collector, config.retry_delay) => mode,
        _ = tokio::signal::ctrl_c() => CollectionMode::NoCollection,
    };
    if mode == CollectionMode::NoCollection {
        connection.shutdown().await;
        return Err(format!(
            "no connection to the garden server at `{}`",
            config.socket_path.display()
        )
        .into());
    }
    log::debug!("Detected garden server at `{}`", config.socket_path.display());

    let mut interval = tokio::time::interval(PULL_TICK);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(PullOutcome::Published { published, skipped }) = collector.pull().await.ok_log_at(log::Level::Warn) {
                    log::trace!("pull published {} records, skipped {:?}", published, skipped);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                break;
            }
        }
    }
    connection.shutdown().await;

    Ok(())
}

/// Detects until the collector reports a mode or a permanent error.
async fn detect<C: Collector>(collector: &C, retry_delay: Duration) -> CollectionMode {
    loop {
        match collector.detect().await {
            Ok(mode) => return mode,
            Err(err) if err.is_retryable() => tokio::time::sleep(retry_delay).await,
            // Already logged by the collector.
            Err(_) => return CollectionMode::NoCollection,
        }
    }
}
