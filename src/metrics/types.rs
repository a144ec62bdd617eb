use serde::Serialize;

use super::histogram::{Bracket, LatencyHistogram};

/// Why a single request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// Connection, TLS, redirect or other transport failure.
    Network,
    /// The per-request deadline expired before the body was drained.
    Timeout,
    /// The response arrived but its body could not be read or decoded.
    Decode,
    /// The request could not be built, e.g. the resolved URL is invalid.
    Validation,
}

/// Outcome of one request, consumed once by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    /// `0` when no response was received.
    pub status_code: u16,
    /// Wall time from dispatch to body drained, in 100µs units.
    pub duration: u64,
    pub bytes: u64,
    pub error: Option<RequestErrorKind>,
}

impl RequestOutcome {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.error, Some(RequestErrorKind::Timeout))
    }
}

/// Numeric digest of a latency histogram, values in 100µs units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramSummary {
    pub max: u64,
    pub min: u64,
    pub mean: f64,
    #[serde(rename = "stddev")]
    pub std_dev: f64,
    pub total_count: u64,
    pub highest_trackable_value: u64,
    pub lowest_trackable_value: u64,
    pub brackets: Vec<Bracket>,
}

impl HistogramSummary {
    #[must_use]
    pub fn from_histogram(histogram: &LatencyHistogram) -> Self {
        Self {
            max: histogram.max(),
            min: histogram.min(),
            mean: histogram.mean(),
            std_dev: histogram.stdev(),
            total_count: histogram.count(),
            highest_trackable_value: histogram.highest_trackable(),
            lowest_trackable_value: histogram.lowest_trackable(),
            brackets: histogram.cumulative_distribution(),
        }
    }
}
