//! In-memory [`GardenApi`] for tests.
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use super::models::{ContainerInfo, ContainerInfoEntry, ContainerMetricsEntry, GardenError, Metrics};
use super::{Error, GardenApi, Result};

#[derive(Debug)]
pub(crate) struct FakeGarden {
    handles: Mutex<Vec<String>>,
    info: Mutex<HashMap<String, ContainerInfoEntry>>,
    metrics: Mutex<HashMap<String, ContainerMetricsEntry>>,
    reachable: AtomicBool,
    ping_delay: Option<Duration>,
    pub fail_containers: AtomicBool,
    pub fail_bulk_info: AtomicBool,
    pub fail_bulk_metrics: AtomicBool,
    pub ping_calls: AtomicUsize,
    pub containers_calls: AtomicUsize,
    pub bulk_info_calls: AtomicUsize,
    pub bulk_metrics_calls: AtomicUsize,
}

impl Default for FakeGarden {
    fn default() -> Self {
        Self {
            handles: Mutex::default(),
            info: Mutex::default(),
            metrics: Mutex::default(),
            reachable: AtomicBool::new(true),
            ping_delay: None,
            fail_containers: AtomicBool::new(false),
            fail_bulk_info: AtomicBool::new(false),
            fail_bulk_metrics: AtomicBool::new(false),
            ping_calls: AtomicUsize::new(0),
            containers_calls: AtomicUsize::new(0),
            bulk_info_calls: AtomicUsize::new(0),
            bulk_metrics_calls: AtomicUsize::new(0),
        }
    }
}

pub(crate) fn info(state: &str) -> ContainerInfo {
    ContainerInfo {
        state: state.to_owned(),
        ..ContainerInfo::default()
    }
}

fn server_error(message: &str) -> Error {
    Error::Status {
        uri: "fake".to_owned(),
        status: 500,
        message: message.to_owned(),
    }
}

impl FakeGarden {
    pub fn with_ping_delay(mut self, delay: Duration) -> Self {
        self.ping_delay = Some(delay);
        self
    }

    /// Lists `handle` and answers `bulk_info` for it with `info`.
    pub fn with_container(self, handle: &str, info: ContainerInfo) -> Self {
        self.handles.lock().unwrap().push(handle.to_owned());
        self.info.lock().unwrap().insert(
            handle.to_owned(),
            ContainerInfoEntry { info, err: None },
        );
        self
    }

    /// Lists `handle` but reports a per-container error in `bulk_info`.
    pub fn with_broken_container(self, handle: &str, message: &str) -> Self {
        self.handles.lock().unwrap().push(handle.to_owned());
        self.info.lock().unwrap().insert(
            handle.to_owned(),
            ContainerInfoEntry {
                info: ContainerInfo::default(),
                err: Some(GardenError {
                    kind: "ContainerNotFoundError".to_owned(),
                    message: message.to_owned(),
                }),
            },
        );
        self
    }

    /// Lists `handle` without any `bulk_info` entry for it.
    pub fn with_listed_handle(self, handle: &str) -> Self {
        self.handles.lock().unwrap().push(handle.to_owned());
        self
    }

    pub fn with_metrics(self, handle: &str, metrics: Metrics) -> Self {
        self.metrics.lock().unwrap().insert(
            handle.to_owned(),
            ContainerMetricsEntry { metrics, err: None },
        );
        self
    }

    pub fn with_metrics_error(self, handle: &str, message: &str) -> Self {
        self.metrics.lock().unwrap().insert(
            handle.to_owned(),
            ContainerMetricsEntry {
                metrics: Metrics::default(),
                err: Some(GardenError {
                    kind: "ServiceUnavailableError".to_owned(),
                    message: message.to_owned(),
                }),
            },
        );
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of calls other than `ping`.
    pub fn backend_calls(&self) -> usize {
        self.containers_calls.load(Ordering::SeqCst)
            + self.bulk_info_calls.load(Ordering::SeqCst)
            + self.bulk_metrics_calls.load(Ordering::SeqCst)
    }
}

impl GardenApi for FakeGarden {
    async fn ping(&self) -> Result<()> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.ping_delay {
            tokio::time::sleep(delay).await;
        }
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(server_error("connection refused"))
        }
    }

    async fn containers(&self) -> Result<Vec<String>> {
        self.containers_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_containers.load(Ordering::SeqCst) {
            return Err(server_error("list failed"));
        }
        Ok(self.handles.lock().unwrap().clone())
    }

    async fn bulk_info(&self, handles: &[String]) -> Result<HashMap<String, ContainerInfoEntry>> {
        self.bulk_info_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bulk_info.load(Ordering::SeqCst) {
            return Err(server_error("bulk info failed"));
        }
        let info = self.info.lock().unwrap();
        Ok(handles
            .iter()
            .filter_map(|h| info.get(h).map(|e| (h.clone(), e.clone())))
            .collect())
    }

    async fn bulk_metrics(
        &self,
        handles: &[String],
    ) -> Result<HashMap<String, ContainerMetricsEntry>> {
        self.bulk_metrics_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bulk_metrics.load(Ordering::SeqCst) {
            return Err(server_error("bulk metrics failed"));
        }
        let metrics = self.metrics.lock().unwrap();
        Ok(handles
            .iter()
            .filter_map(|h| metrics.get(h).map(|e| (h.clone(), e.clone())))
            .collect())
    }
}
