use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::RunResult;
use crate::error::{AppResult, MetricsError};
use crate::http::{LoadGenerator, UrlReplacer};
use crate::metrics::{RequestOutcome, setup_histogram_aggregator};

use super::settings::RunSettings;

/// Bound on outcomes buffered between workers and the aggregator.
pub const OUTCOME_QUEUE_CAPACITY: usize = 1024;

/// One runner's engine: a worker pool feeding a single aggregator.
#[derive(Debug)]
pub struct Runner {
    generator: LoadGenerator,
    timeout: Duration,
}

impl Runner {
    /// # Errors
    ///
    /// Returns an error when the target HTTP client cannot be built.
    pub fn new(settings: &RunSettings, replacer: Arc<dyn UrlReplacer>) -> AppResult<Self> {
        Ok(Self {
            generator: LoadGenerator::new(settings, replacer)?,
            timeout: settings.timeout,
        })
    }

    /// Generates load for the configured duration and returns the sealed
    /// result once every outcome has been aggregated.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker panics or the histogram cannot be built
    /// or exported.
    pub async fn run(&self) -> AppResult<RunResult> {
        let (outcome_tx, outcome_rx) = mpsc::channel::<RequestOutcome>(OUTCOME_QUEUE_CAPACITY);
        let aggregator = setup_histogram_aggregator(self.timeout, outcome_rx)?;

        info!("Starting {} workers.", self.generator.concurrency());
        let workers = self.generator.spawn_workers(&outcome_tx);
        drop(outcome_tx);

        let result = join_run(workers, aggregator).await?;

        info!(
            "Run finished: {} requests, {} errors, {} timeouts in {:?}.",
            result.requests, result.errors, result.timeouts, result.time
        );
        Ok(result)
    }
}

/// Joins every worker, then the aggregator. A failed worker is reported only
/// after all of them have stopped and the queue has drained.
pub(super) async fn join_run(
    workers: Vec<JoinHandle<()>>,
    aggregator: JoinHandle<Result<RunResult, MetricsError>>,
) -> AppResult<RunResult> {
    let mut first_failure = None;
    for (worker_id, worker) in workers.into_iter().enumerate() {
        if let Err(err) = worker.await {
            warn!("Worker {} failed: {}", worker_id, err);
            if first_failure.is_none() {
                first_failure = Some(err);
            }
        }
    }

    let aggregated = aggregator
        .await
        .map_err(|err| MetricsError::AggregatorJoin { source: err });

    if let Some(err) = first_failure {
        return Err(err.into());
    }
    Ok(aggregated??)
}
