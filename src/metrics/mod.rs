//! Latency histograms and the per-runner outcome aggregator.
mod aggregator;
mod histogram;
mod types;

#[cfg(test)]
mod tests;

pub use aggregator::{HistogramAggregator, setup_histogram_aggregator};
pub use histogram::{
    Bracket, HistogramSnapshot, LOWEST_TRACKABLE_VALUE, LatencyHistogram, SIGNIFICANT_FIGURES,
    hundred_micros,
};
pub use types::{HistogramSummary, RequestErrorKind, RequestOutcome};
