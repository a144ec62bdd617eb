use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::domain::{Job, RunResult};
use crate::error::OrchestratorError;
use crate::metrics::{HistogramSummary, LatencyHistogram};

/// What `/result` returns once every task has reported.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job: Job,
    pub summary: HistogramSummary,
    pub result: RunResult,
}

/// Folds every task result of `job` into one.
///
/// The job's start and end times become the earliest task start and the
/// latest task end; the merged `time` is their span.
///
/// # Errors
///
/// Returns [`OrchestratorError::JobNotDone`] while any task result is
/// missing, or a histogram error if a snapshot cannot be imported or merged.
pub fn merge_job(mut job: Job) -> Result<JobReport, OrchestratorError> {
    if !job.all_reported() {
        return Err(OrchestratorError::JobNotDone {
            run_id: job.run_id,
        });
    }

    let mut merged = LatencyHistogram::for_timeout(job.timeout).map_err(|err| {
        OrchestratorError::Histogram {
            context: "create job histogram",
            source: err,
        }
    })?;
    let mut totals = RunResult {
        requests: 0,
        errors: 0,
        timeouts: 0,
        status_codes: BTreeMap::new(),
        time: Duration::ZERO,
        histogram: merged.snapshot().map_err(|err| OrchestratorError::Histogram {
            context: "export job histogram",
            source: err,
        })?,
        start_time: None,
        end_time: None,
    };

    for result in job.tasks.iter().filter_map(|task| task.result.as_ref()) {
        let task_histogram = LatencyHistogram::from_snapshot(&result.histogram).map_err(|err| {
            OrchestratorError::Histogram {
                context: "import task histogram",
                source: err,
            }
        })?;
        merged
            .merge(&task_histogram)
            .map_err(|err| OrchestratorError::Histogram {
                context: "merge task histogram",
                source: err,
            })?;
        totals.add_counters(result);
        totals.start_time = earliest(totals.start_time, result.start_time);
        totals.end_time = latest(totals.end_time, result.end_time);
    }

    totals.histogram = merged
        .snapshot()
        .map_err(|err| OrchestratorError::Histogram {
            context: "export job histogram",
            source: err,
        })?;
    if let (Some(start), Some(end)) = (totals.start_time, totals.end_time) {
        totals.time = end
            .signed_duration_since(start)
            .to_std()
            .unwrap_or(Duration::ZERO);
    }
    job.start_time = totals.start_time;
    job.end_time = totals.end_time;

    Ok(JobReport {
        job,
        summary: HistogramSummary::from_histogram(&merged),
        result: totals,
    })
}

fn earliest<T: Ord>(current: Option<T>, candidate: Option<T>) -> Option<T> {
    match (current, candidate) {
        (Some(left), Some(right)) => Some(left.min(right)),
        (left, right) => left.or(right),
    }
}

fn latest<T: Ord>(current: Option<T>, candidate: Option<T>) -> Option<T> {
    match (current, candidate) {
        (Some(left), Some(right)) => Some(left.max(right)),
        (left, right) => left.or(right),
    }
}
