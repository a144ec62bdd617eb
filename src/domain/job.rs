use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::RunResult;
use super::serde_time::duration_nanos;

/// One runner's share of a job.
///
/// Every mutable field is written by the runner that owns `id`; the
/// orchestrator only persists what that runner reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub container_id: String,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub result: Option<RunResult>,
    #[serde(default)]
    pub logs: String,
    pub concurrency: usize,
}

impl Task {
    #[must_use]
    pub const fn new(id: String, container_id: String, concurrency: usize) -> Self {
        Self {
            id,
            container_id,
            ready: false,
            result: None,
            logs: String::new(),
            concurrency,
        }
    }
}

/// A single benchmark run and the tasks it was split into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub run_id: String,
    pub concurrency: usize,
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    #[serde(with = "duration_nanos")]
    pub timeout: Duration,
    pub url: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    pub request_time: DateTime<Utc>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Lifecycle position of a job, derived from its task flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobPhase {
    Created,
    AwaitingReady,
    Running,
    Collecting,
    Complete,
}

/// Answer given to a runner polling the start barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierState {
    Proceed,
    KeepWaiting,
}

impl Job {
    /// True once every task has passed the start barrier.
    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.tasks.iter().all(|task| task.ready)
    }

    #[must_use]
    pub fn barrier(&self) -> BarrierState {
        if self.all_ready() {
            BarrierState::Proceed
        } else {
            BarrierState::KeepWaiting
        }
    }

    #[must_use]
    pub fn all_reported(&self) -> bool {
        self.tasks.iter().all(|task| task.result.is_some())
    }

    #[must_use]
    pub fn phase(&self) -> JobPhase {
        let ready = self.tasks.iter().filter(|task| task.ready).count();
        let reported = self.tasks.iter().filter(|task| task.result.is_some()).count();
        let total = self.tasks.len();

        if total > 0 && reported == total {
            JobPhase::Complete
        } else if reported > 0 {
            JobPhase::Collecting
        } else if total > 0 && ready == total {
            JobPhase::Running
        } else if ready > 0 {
            JobPhase::AwaitingReady
        } else {
            JobPhase::Created
        }
    }
}
