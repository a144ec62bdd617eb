use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serde_time::duration_nanos;
use crate::metrics::HistogramSnapshot;

/// Aggregate outcome of one runner, or of a whole job once merged.
///
/// `timeouts` counts a subset of `errors`; status `0` means no response
/// arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub requests: u64,
    pub errors: u64,
    pub timeouts: u64,
    #[serde(default)]
    pub status_codes: BTreeMap<u16, u64>,
    #[serde(with = "duration_nanos")]
    pub time: Duration,
    pub histogram: HistogramSnapshot,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl RunResult {
    /// Adds another result's counters into this one. Histograms are merged
    /// separately because that needs the job's trackable range.
    pub fn add_counters(&mut self, other: &RunResult) {
        self.requests = self.requests.saturating_add(other.requests);
        self.errors = self.errors.saturating_add(other.errors);
        self.timeouts = self.timeouts.saturating_add(other.timeouts);
        for (status, count) in &other.status_codes {
            let entry = self.status_codes.entry(*status).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
    }
}
