use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::retry::{Retrier, RetryError, RetryStatus, RetryStrategy};

use super::GardenApi;

/// Attempts before an unreachable Garden server is given up on.
pub const DEFAULT_RETRY_COUNT: u32 = 10;
/// Minimum time between two health probes.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Hands out a shared Garden client once it answered a health probe.
///
/// All callers share one [`Retrier`], so concurrent first-time callers run a
/// single probe and the rest observe its result.
#[derive(Debug)]
pub struct ConnectionService<C> {
    client: Arc<C>,
    retrier: Mutex<Retrier>,
}

impl<C: GardenApi> ConnectionService<C> {
    pub fn new(client: C, strategy: RetryStrategy) -> Self {
        Self {
            client: Arc::new(client),
            retrier: Mutex::new(Retrier::new("garden", strategy)),
        }
    }

    /// Uses [`DEFAULT_RETRY_COUNT`] attempts spaced [`DEFAULT_RETRY_DELAY`] apart.
    pub fn with_default_policy(client: C) -> Self {
        Self::new(
            client,
            RetryStrategy::RetryCount {
                count: DEFAULT_RETRY_COUNT,
                delay: DEFAULT_RETRY_DELAY,
            },
        )
    }

    /// Returns the client, probing the server first if no probe succeeded yet.
    ///
    /// # Errors
    ///
    /// Returns a retryable [`RetryError`] while probes keep failing (or the
    /// next probe is not due yet), and a permanent one once the attempt
    /// budget is exhausted or the service was shut down.
    pub async fn acquire(&self) -> Result<Arc<C>, RetryError> {
        let mut retrier = self.retrier.lock().await;
        let client = &self.client;
        retrier.trigger(|| client.ping()).await?;

        Ok(Arc::clone(&self.client))
    }

    pub async fn state(&self) -> RetryStatus {
        self.retrier.lock().await.status()
    }

    /// Closes the service; every later [`acquire`](Self::acquire) fails permanently.
    pub async fn shutdown(&self) {
        log::debug!("Shutting down garden connection");
        self.retrier.lock().await.close();
    }

    #[cfg(test)]
    pub(crate) fn client_for_tests(&self) -> &C {
        &self.client
    }
}
