//! Job and task persistence.
//!
//! Records are opaque JSON blobs under `JOB_<run>` (job without tasks),
//! `JOB_<run>_TASK_<task>` and an ordered task index `JOB_<run>_TASKS`.
mod keys;
mod memory;
mod records;
mod sqlite;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::domain::{Job, Task};
use crate::error::StorageError;

pub use keys::{job_key, task_index_key, task_key};
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Persists and rehydrates jobs and their tasks.
#[async_trait]
pub trait StorageManager: Send + Sync + std::fmt::Debug {
    async fn save_task(&self, run_id: &str, task: &Task) -> Result<(), StorageError>;

    async fn get_task(&self, run_id: &str, task_id: &str) -> Result<Task, StorageError>;

    /// Writes the job blob, every task and the task index.
    async fn save_job(&self, job: &Job) -> Result<(), StorageError>;

    /// Loads the job blob and rehydrates its tasks in index order.
    async fn get_job(&self, run_id: &str) -> Result<Job, StorageError>;
}
