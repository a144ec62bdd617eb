use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::args::{PositiveUsize, format_duration};
use crate::container::ContainerManager;
use crate::domain::{BarrierState, Job, RunResult, Task};
use crate::error::OrchestratorError;
use crate::runner::{
    ENV_API_URL, ENV_CONCURRENCY, ENV_DURATION, ENV_RUN_ID, ENV_RUNNER_ID, ENV_TIMEOUT, ENV_URL,
};
use crate::storage::StorageManager;

use super::merge::{JobReport, merge_job};
use super::partition::partition_concurrency;
use super::request::StartRequest;

/// Splits runs into tasks, starts their runners and tracks them in storage.
///
/// Holds no per-run state of its own; every call reads what it needs.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    containers: Arc<dyn ContainerManager>,
    storage: Arc<dyn StorageManager>,
    max_per_container: PositiveUsize,
    public_url: String,
}

impl Orchestrator {
    #[must_use]
    pub const fn new(
        containers: Arc<dyn ContainerManager>,
        storage: Arc<dyn StorageManager>,
        max_per_container: PositiveUsize,
        public_url: String,
    ) -> Self {
        Self {
            containers,
            storage,
            max_per_container,
            public_url,
        }
    }

    /// Starts one runner per share of `request.concurrency` and persists the
    /// job. A failed start aborts the call; runners already started keep
    /// running.
    ///
    /// # Errors
    ///
    /// Returns an error when a runner cannot be started or the job cannot be
    /// saved.
    pub async fn start(&self, request: StartRequest) -> Result<Job, OrchestratorError> {
        let run_id = Uuid::new_v4().to_string();
        let shares = partition_concurrency(request.concurrency, self.max_per_container);
        info!(
            "Starting run {} for {} with {} workers in {} tasks.",
            run_id,
            request.url,
            request.concurrency,
            shares.len()
        );

        let mut tasks = Vec::with_capacity(shares.len());
        for share in shares {
            let runner_id = Uuid::new_v4().to_string();
            let env = self.runner_env(&request, &run_id, &runner_id, share);
            let container_id = self.containers.start_container(env).await.map_err(|err| {
                OrchestratorError::StartContainer {
                    runner_id: runner_id.clone(),
                    source: err,
                }
            })?;
            debug!(
                "Run {} task {} started as {} with {} workers.",
                run_id, runner_id, container_id, share
            );
            tasks.push(Task::new(runner_id, container_id, share));
        }

        let job = Job {
            run_id,
            concurrency: request.concurrency,
            duration: request.duration,
            timeout: request.timeout,
            url: request.url,
            meta: request.meta,
            request_time: Utc::now(),
            start_time: None,
            end_time: None,
            tasks,
        };
        self.storage
            .save_job(&job)
            .await
            .map_err(|err| OrchestratorError::storage("error saving job", err))?;
        Ok(job)
    }

    fn runner_env(
        &self,
        request: &StartRequest,
        run_id: &str,
        runner_id: &str,
        share: usize,
    ) -> BTreeMap<String, String> {
        BTreeMap::from([
            (ENV_CONCURRENCY.to_owned(), share.to_string()),
            (ENV_URL.to_owned(), request.url.clone()),
            (ENV_DURATION.to_owned(), format_duration(request.duration)),
            (ENV_TIMEOUT.to_owned(), format_duration(request.timeout)),
            (ENV_RUN_ID.to_owned(), run_id.to_owned()),
            (ENV_RUNNER_ID.to_owned(), runner_id.to_owned()),
            (ENV_API_URL.to_owned(), self.public_url.clone()),
        ])
    }

    /// Marks a task as past its startup. Repeating the call is harmless.
    ///
    /// # Errors
    ///
    /// Returns an error when the task is unknown or cannot be saved.
    pub async fn ready_to_start(&self, run_id: &str, task_id: &str) -> Result<(), OrchestratorError> {
        let mut task = self
            .storage
            .get_task(run_id, task_id)
            .await
            .map_err(|err| OrchestratorError::storage("error getting task", err))?;
        task.ready = true;
        self.storage
            .save_task(run_id, &task)
            .await
            .map_err(|err| OrchestratorError::storage("error saving task", err))?;
        info!("Run {} task {} is ready.", run_id, task_id);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error when the job cannot be loaded.
    pub async fn wait_for_start(&self, run_id: &str) -> Result<BarrierState, OrchestratorError> {
        let job = self.job(run_id).await?;
        debug!("Run {} polled at the barrier in phase {:?}.", run_id, job.phase());
        Ok(job.barrier())
    }

    /// Stores a task's result, replacing any earlier report.
    ///
    /// # Errors
    ///
    /// Returns an error when the task is unknown or cannot be saved.
    pub async fn report_result(
        &self,
        run_id: &str,
        task_id: &str,
        result: RunResult,
    ) -> Result<(), OrchestratorError> {
        let mut task = self
            .storage
            .get_task(run_id, task_id)
            .await
            .map_err(|err| OrchestratorError::storage("error getting task", err))?;
        info!(
            "Run {} task {} reported {} requests, {} errors.",
            run_id, task_id, result.requests, result.errors
        );
        task.result = Some(result);
        self.storage
            .save_task(run_id, &task)
            .await
            .map_err(|err| OrchestratorError::storage("error saving task", err))
    }

    /// Merges every task result of the run.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::JobNotDone`] while a task has not
    /// reported, or an error when the job cannot be loaded or merged.
    pub async fn result(&self, run_id: &str) -> Result<JobReport, OrchestratorError> {
        let job = self.job(run_id).await?;
        merge_job(job)
    }

    /// # Errors
    ///
    /// Returns an error when the container manager cannot produce the logs.
    pub async fn logs(&self, container_id: &str) -> Result<String, OrchestratorError> {
        self.containers
            .get_logs(container_id)
            .await
            .map_err(|err| OrchestratorError::Logs {
                id: container_id.to_owned(),
                source: err,
            })
    }

    /// Tasks of a run with their current logs. Logs that cannot be read are
    /// left empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the job cannot be loaded.
    pub async fn tasks(&self, run_id: &str) -> Result<Vec<Task>, OrchestratorError> {
        let job = self.job(run_id).await?;
        let mut tasks = job.tasks;
        for task in &mut tasks {
            match self.containers.get_logs(&task.container_id).await {
                Ok(logs) => task.logs = logs,
                Err(err) => debug!("No logs for {}: {}", task.container_id, err),
            }
        }
        Ok(tasks)
    }

    async fn job(&self, run_id: &str) -> Result<Job, OrchestratorError> {
        self.storage
            .get_job(run_id)
            .await
            .map_err(|err| OrchestratorError::storage("error getting job", err))
    }
}
