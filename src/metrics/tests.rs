use super::*;
use crate::error::{AppError, AppResult};
use crate::test_support::run_async_test;
use chrono::Utc;
use std::time::Duration;
use tokio::sync::mpsc;

const TEST_TIMEOUT: Duration = Duration::from_millis(100);

fn histogram_with(values: &[u64]) -> AppResult<LatencyHistogram> {
    let mut histogram = LatencyHistogram::for_timeout(TEST_TIMEOUT)?;
    for value in values {
        if !histogram.record(*value) {
            return Err(AppError::metrics(format!("Value {} was dropped", value)));
        }
    }
    Ok(histogram)
}

const fn outcome(status_code: u16, duration: u64, error: Option<RequestErrorKind>) -> RequestOutcome {
    RequestOutcome {
        status_code,
        duration,
        bytes: 2,
        error,
    }
}

#[test]
fn hundred_micros_rounds_to_nearest() -> AppResult<()> {
    let cases = [
        (Duration::from_micros(0), 0),
        (Duration::from_micros(49), 0),
        (Duration::from_micros(50), 1),
        (Duration::from_micros(149), 1),
        (Duration::from_micros(150), 2),
        (Duration::from_millis(100), 1_000),
        (Duration::from_secs(2), 20_000),
    ];
    for (input, expected) in cases {
        let actual = hundred_micros(input);
        if actual != expected {
            return Err(AppError::metrics(format!(
                "{:?} should be {} units, got {}",
                input, expected, actual
            )));
        }
    }
    Ok(())
}

#[test]
fn histogram_range_follows_timeout() -> AppResult<()> {
    let histogram = LatencyHistogram::for_timeout(Duration::from_millis(50))?;
    if histogram.highest_trackable() != 500 {
        return Err(AppError::metrics(format!(
            "Expected highest trackable 500, got {}",
            histogram.highest_trackable()
        )));
    }
    if histogram.lowest_trackable() != LOWEST_TRACKABLE_VALUE {
        return Err(AppError::metrics("Unexpected lowest trackable value"));
    }
    Ok(())
}

#[test]
fn reported_range_starts_at_zero() -> AppResult<()> {
    let histogram = histogram_with(&[0, 0, 4])?;
    let summary = HistogramSummary::from_histogram(&histogram);
    if summary.lowest_trackable_value != 0 || summary.min != 0 {
        return Err(AppError::metrics(format!(
            "Expected range and min to start at 0, got lowest {} min {}",
            summary.lowest_trackable_value, summary.min
        )));
    }
    if histogram.snapshot()?.lowest_trackable_value != 0 {
        return Err(AppError::metrics("Snapshot should report a lowest value of 0"));
    }
    if histogram.count_at(0) != 2 {
        return Err(AppError::metrics("Zero latencies should share one bucket"));
    }
    Ok(())
}

#[test]
fn tiny_timeout_still_builds_histogram() -> AppResult<()> {
    let histogram = LatencyHistogram::for_timeout(Duration::from_micros(10))?;
    if histogram.highest_trackable() < 2 {
        return Err(AppError::metrics("Highest trackable value must be >= 2"));
    }
    Ok(())
}

#[test]
fn record_drops_values_far_above_range() -> AppResult<()> {
    let mut histogram = LatencyHistogram::for_timeout(TEST_TIMEOUT)?;
    if histogram.record(10_000_000) {
        return Err(AppError::metrics("Out-of-range value should be dropped"));
    }
    if !histogram.record(0) {
        return Err(AppError::metrics("Zero latency should be recorded"));
    }
    if histogram.count() != 1 {
        return Err(AppError::metrics(format!(
            "Expected 1 recorded value, got {}",
            histogram.count()
        )));
    }
    Ok(())
}

#[test]
fn snapshot_reimport_preserves_statistics() -> AppResult<()> {
    let histogram = histogram_with(&[3, 7, 7, 12, 250, 999])?;
    let snapshot = histogram.snapshot()?;
    let restored = LatencyHistogram::from_snapshot(&snapshot)?;

    if restored.count() != histogram.count()
        || restored.min() != histogram.min()
        || restored.max() != histogram.max()
    {
        return Err(AppError::metrics("count/min/max changed across snapshot"));
    }
    if restored.mean().to_bits() != histogram.mean().to_bits()
        || restored.stdev().to_bits() != histogram.stdev().to_bits()
    {
        return Err(AppError::metrics("mean/stddev changed across snapshot"));
    }
    for value in [3, 7, 12, 250, 999] {
        if restored.count_at(value) != histogram.count_at(value) {
            return Err(AppError::metrics(format!("bucket for {} changed", value)));
        }
    }
    if snapshot.significant_figures != SIGNIFICANT_FIGURES
        || snapshot.highest_trackable_value != histogram.highest_trackable()
        || snapshot.lowest_trackable_value != 0
    {
        return Err(AppError::metrics("snapshot metadata does not match"));
    }
    Ok(())
}

#[test]
fn merge_is_commutative_and_additive() -> AppResult<()> {
    let left = histogram_with(&[1, 5, 5, 80])?;
    let right = histogram_with(&[2, 5, 400, 900, 950])?;

    let mut left_then_right = left.clone();
    left_then_right.merge(&right)?;
    let mut right_then_left = right.clone();
    right_then_left.merge(&left)?;

    let expected_total = left.count().saturating_add(right.count());
    if left_then_right.count() != expected_total || right_then_left.count() != expected_total {
        return Err(AppError::metrics(format!(
            "Expected merged total {}, got {} and {}",
            expected_total,
            left_then_right.count(),
            right_then_left.count()
        )));
    }
    if left_then_right.snapshot()? != right_then_left.snapshot()? {
        return Err(AppError::metrics("merge order changed the histogram"));
    }
    Ok(())
}

#[test]
fn cumulative_distribution_ends_at_total() -> AppResult<()> {
    let histogram = histogram_with(&[1, 2, 3, 4, 100])?;
    let brackets = histogram.cumulative_distribution();
    let last = brackets
        .last()
        .ok_or_else(|| AppError::metrics("Expected at least one bracket"))?;
    if last.count != histogram.count() {
        return Err(AppError::metrics(format!(
            "Last bracket count {} != total {}",
            last.count,
            histogram.count()
        )));
    }
    if !LatencyHistogram::for_timeout(TEST_TIMEOUT)?
        .cumulative_distribution()
        .is_empty()
    {
        return Err(AppError::metrics("Empty histogram should have no brackets"));
    }
    Ok(())
}

#[test]
fn aggregator_counts_errors_and_timeouts() -> AppResult<()> {
    let mut aggregator = HistogramAggregator::new(TEST_TIMEOUT)?;
    aggregator.record(&outcome(200, 4, None));
    aggregator.record(&outcome(200, 6, None));
    aggregator.record(&outcome(0, 1_000, Some(RequestErrorKind::Timeout)));
    aggregator.record(&outcome(0, 3, Some(RequestErrorKind::Network)));
    aggregator.record(&outcome(503, 9_999_999, None));

    let result = aggregator.finish(Utc::now(), Utc::now(), Duration::from_millis(5))?;

    if result.requests != 5 || result.errors != 2 || result.timeouts != 1 {
        return Err(AppError::metrics(format!(
            "Unexpected counters: requests={} errors={} timeouts={}",
            result.requests, result.errors, result.timeouts
        )));
    }
    if result.status_codes.get(&200) != Some(&2)
        || result.status_codes.get(&0) != Some(&2)
        || result.status_codes.get(&503) != Some(&1)
    {
        return Err(AppError::metrics(format!(
            "Unexpected status codes: {:?}",
            result.status_codes
        )));
    }
    let histogram = LatencyHistogram::from_snapshot(&result.histogram)?;
    if histogram.count() != 4 {
        return Err(AppError::metrics(format!(
            "Out-of-range latency should be dropped from the histogram, got {}",
            histogram.count()
        )));
    }
    Ok(())
}

#[test]
fn aggregator_task_finishes_when_senders_close() -> AppResult<()> {
    run_async_test(async {
        let (outcome_tx, outcome_rx) = mpsc::channel::<RequestOutcome>(4);
        let handle = setup_histogram_aggregator(TEST_TIMEOUT, outcome_rx)?;

        for _ in 0..10 {
            outcome_tx
                .send(outcome(200, 2, None))
                .await
                .map_err(|err| AppError::metrics(format!("send failed: {}", err)))?;
        }
        drop(outcome_tx);

        let result = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .map_err(|err| AppError::metrics(format!("Aggregator did not finish: {}", err)))?
            .map_err(|err| AppError::metrics(format!("Aggregator join error: {}", err)))??;

        if result.requests != 10 {
            return Err(AppError::metrics(format!(
                "Expected 10 requests, got {}",
                result.requests
            )));
        }
        if result.start_time.is_none() || result.end_time.is_none() {
            return Err(AppError::metrics("Result should carry start and end times"));
        }
        Ok(())
    })
}
