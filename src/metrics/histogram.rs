use std::io::Cursor;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hdrhistogram::Histogram;
use hdrhistogram::serialization::{Deserializer, Serializer, V2Serializer};
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

/// Latencies are recorded in units of 100µs.
pub const HUNDRED_MICROS: u128 = 100;
/// Added before dividing so the conversion rounds to nearest.
const ROUNDING_BIAS_MICROS: u128 = 50;
/// Decimal digits of precision kept per bucket.
pub const SIGNIFICANT_FIGURES: u8 = 2;
/// Reported lower bound of the range. Zero latencies are recorded.
pub const LOWEST_TRACKABLE_VALUE: u64 = 0;
/// hdrhistogram cannot be built with a lower bound below 1; values under it
/// share the first bucket.
const HDR_LOWEST_DISCERNIBLE: u64 = 1;
/// hdrhistogram needs `high >= 2 * low`.
const MIN_HIGHEST_TRACKABLE_VALUE: u64 = 2;

/// Converts a duration to hundred-microsecond units, rounding half up.
#[must_use]
pub fn hundred_micros(duration: Duration) -> u64 {
    let rounded = duration
        .as_micros()
        .saturating_add(ROUNDING_BIAS_MICROS)
        .checked_div(HUNDRED_MICROS)
        .unwrap_or(0);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Serialized, mergeable form of a [`LatencyHistogram`].
///
/// The range fields mirror what is inside `counts` so readers do not have to
/// decode the payload to learn the histogram's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramSnapshot {
    pub lowest_trackable_value: u64,
    pub highest_trackable_value: u64,
    pub significant_figures: u8,
    /// Bucket counts in hdrhistogram V2 encoding, base64.
    pub counts: String,
}

/// One step of the cumulative latency distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub quantile: f64,
    pub count: u64,
    pub value_at: u64,
}

#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a histogram covering `[0, highest]` hundred-microsecond units.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new(highest: u64) -> Result<Self, MetricsError> {
        let highest = highest.max(MIN_HIGHEST_TRACKABLE_VALUE);
        let hist =
            Histogram::<u64>::new_with_bounds(HDR_LOWEST_DISCERNIBLE, highest, SIGNIFICANT_FIGURES)
                .map_err(|err| MetricsError::Histogram {
                    context: "create histogram",
                    source: err.to_string().into(),
                })?;
        Ok(Self { hist })
    }

    /// Create a histogram whose top bucket is the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn for_timeout(timeout: Duration) -> Result<Self, MetricsError> {
        Self::new(hundred_micros(timeout))
    }

    /// Record one latency in hundred-microsecond units.
    ///
    /// Values above the trackable range are dropped; returns whether the
    /// value was kept.
    pub fn record(&mut self, value: u64) -> bool {
        self.hist.record(value).is_ok()
    }

    /// Merge another histogram into this one.
    ///
    /// # Errors
    ///
    /// Returns an error if `other` holds values outside this histogram's range.
    pub fn merge(&mut self, other: &LatencyHistogram) -> Result<(), MetricsError> {
        self.hist
            .add(&other.hist)
            .map_err(|err| MetricsError::Histogram {
                context: "merge histogram",
                source: err.to_string().into(),
            })
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }

    #[must_use]
    pub fn min(&self) -> u64 {
        self.hist.min()
    }

    #[must_use]
    pub fn max(&self) -> u64 {
        self.hist.max()
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.hist.mean()
    }

    #[must_use]
    pub fn stdev(&self) -> f64 {
        self.hist.stdev()
    }

    #[must_use]
    pub const fn lowest_trackable(&self) -> u64 {
        LOWEST_TRACKABLE_VALUE
    }

    #[must_use]
    pub fn highest_trackable(&self) -> u64 {
        self.hist.high()
    }

    #[must_use]
    pub fn count_at(&self, value: u64) -> u64 {
        self.hist.count_at(value)
    }

    /// Walks the distribution at one tick per half-distance, accumulating
    /// the count reached at each quantile.
    #[must_use]
    pub fn cumulative_distribution(&self) -> Vec<Bracket> {
        if self.count() == 0 {
            return Vec::new();
        }
        let mut cumulative = 0u64;
        self.hist
            .iter_quantiles(1)
            .map(|step| {
                cumulative = cumulative.saturating_add(step.count_since_last_iteration());
                Bracket {
                    quantile: step.quantile_iterated_to(),
                    count: cumulative,
                    value_at: step.value_iterated_to(),
                }
            })
            .collect()
    }

    /// Export the histogram as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be serialized.
    pub fn snapshot(&self) -> Result<HistogramSnapshot, MetricsError> {
        Ok(HistogramSnapshot {
            lowest_trackable_value: self.lowest_trackable(),
            highest_trackable_value: self.hist.high(),
            significant_figures: self.hist.sigfig(),
            counts: self.encode_base64()?,
        })
    }

    /// Rebuild a histogram from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be decoded or deserialized.
    pub fn from_snapshot(snapshot: &HistogramSnapshot) -> Result<Self, MetricsError> {
        Self::decode_base64(&snapshot.counts)
    }

    fn encode_base64(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        V2Serializer::new()
            .serialize(&self.hist, &mut buffer)
            .map_err(|err| MetricsError::Histogram {
                context: "serialize histogram",
                source: err.to_string().into(),
            })?;
        Ok(B64.encode(buffer))
    }

    fn decode_base64(encoded: &str) -> Result<Self, MetricsError> {
        let bytes = B64
            .decode(encoded.as_bytes())
            .map_err(|err| MetricsError::DecodeSnapshot { source: err })?;
        let mut cursor = Cursor::new(bytes);
        let hist: Histogram<u64> =
            Deserializer::new()
                .deserialize(&mut cursor)
                .map_err(|err| MetricsError::Histogram {
                    context: "deserialize histogram",
                    source: err.to_string().into(),
                })?;
        Ok(Self { hist })
    }
}
