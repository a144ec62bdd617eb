use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::error::HttpError;
use crate::metrics::RequestOutcome;
use crate::runner::RunSettings;

use super::execution::{build_target_client, execute_get};
use super::replacer::UrlReplacer;

/// Fixed pool of closed-loop workers hammering one URL.
#[derive(Debug, Clone)]
pub struct LoadGenerator {
    client: Client,
    url: Arc<str>,
    concurrency: usize,
    duration: Duration,
    timeout: Duration,
    replacer: Arc<dyn UrlReplacer>,
}

impl LoadGenerator {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(settings: &RunSettings, replacer: Arc<dyn UrlReplacer>) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_target_client(settings.timeout)?,
            url: Arc::from(settings.url.as_str()),
            concurrency: settings.concurrency.get(),
            duration: settings.duration,
            timeout: settings.timeout,
            replacer,
        })
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Starts every worker; each holds its own clone of `outcome_tx`.
    ///
    /// A worker stops once its own elapsed time reaches the duration, or
    /// early if the aggregator has gone away.
    #[must_use]
    pub fn spawn_workers(&self, outcome_tx: &mpsc::Sender<RequestOutcome>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.concurrency);
        for worker_id in 0..self.concurrency {
            let client = self.client.clone();
            let url = Arc::clone(&self.url);
            let replacer = Arc::clone(&self.replacer);
            let outcome_tx = outcome_tx.clone();
            let duration = self.duration;
            let timeout = self.timeout;

            handles.push(tokio::spawn(async move {
                let started = Instant::now();
                let mut sent: u64 = 0;
                while started.elapsed() < duration {
                    let target = replacer.replace(&url);
                    let outcome = execute_get(&client, &target, timeout).await;
                    if outcome_tx.send(outcome).await.is_err() {
                        debug!("Worker {} stopping: outcome queue closed.", worker_id);
                        break;
                    }
                    sent = sent.saturating_add(1);
                }
                debug!("Worker {} finished after {} requests.", worker_id, sent);
            }));
        }
        handles
    }
}
