use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::RunResult;
use crate::error::MetricsError;

use super::histogram::LatencyHistogram;
use super::types::RequestOutcome;

/// Sole owner of a runner's latency histogram and counters.
#[derive(Debug)]
pub struct HistogramAggregator {
    histogram: LatencyHistogram,
    requests: u64,
    errors: u64,
    timeouts: u64,
    dropped: u64,
    status_codes: BTreeMap<u16, u64>,
}

impl HistogramAggregator {
    /// Build an aggregator whose histogram tops out at `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, MetricsError> {
        Ok(Self {
            histogram: LatencyHistogram::for_timeout(timeout)?,
            requests: 0,
            errors: 0,
            timeouts: 0,
            dropped: 0,
            status_codes: BTreeMap::new(),
        })
    }

    pub fn record(&mut self, outcome: &RequestOutcome) {
        if !self.histogram.record(outcome.duration) {
            self.dropped = self.dropped.saturating_add(1);
        }
        self.requests = self.requests.saturating_add(1);
        if outcome.is_error() {
            self.errors = self.errors.saturating_add(1);
        }
        if outcome.is_timeout() {
            self.timeouts = self.timeouts.saturating_add(1);
        }
        let entry = self.status_codes.entry(outcome.status_code).or_insert(0);
        *entry = entry.saturating_add(1);
    }

    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests
    }

    /// Seal the counters into a result.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be exported.
    pub fn finish(
        self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        elapsed: Duration,
    ) -> Result<RunResult, MetricsError> {
        if self.dropped > 0 {
            debug!(
                "Dropped {} latencies above the histogram range ({} units).",
                self.dropped,
                self.histogram.highest_trackable()
            );
        }
        Ok(RunResult {
            requests: self.requests,
            errors: self.errors,
            timeouts: self.timeouts,
            status_codes: self.status_codes,
            time: elapsed,
            histogram: self.histogram.snapshot()?,
            start_time: Some(start_time),
            end_time: Some(end_time),
        })
    }
}

/// Spawns the consumer that drains `outcome_rx` until every sender is gone.
///
/// # Errors
///
/// Returns an error if the histogram cannot be created.
pub fn setup_histogram_aggregator(
    timeout: Duration,
    mut outcome_rx: mpsc::Receiver<RequestOutcome>,
) -> Result<JoinHandle<Result<RunResult, MetricsError>>, MetricsError> {
    let mut aggregator = HistogramAggregator::new(timeout)?;

    Ok(tokio::spawn(async move {
        let start_time = Utc::now();
        let clock = Instant::now();

        while let Some(outcome) = outcome_rx.recv().await {
            aggregator.record(&outcome);
        }

        debug!("Outcome queue closed after {} requests.", aggregator.requests());
        aggregator.finish(start_time, Utc::now(), clock.elapsed())
    }))
}
