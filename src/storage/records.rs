use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{Job, Task};
use crate::error::StorageError;

use super::StorageManager;
use super::keys::{job_key, task_key};

/// Raw key/blob operations a backend provides; the job and task layout on
/// top of them is shared.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    async fn put(&self, key: String, value: String) -> Result<(), StorageError>;

    async fn fetch(&self, key: String) -> Result<Option<String>, StorageError>;

    /// Adds `task_id` to the run's index; re-adding keeps the first position.
    async fn add_task_id(&self, run_id: String, task_id: String) -> Result<(), StorageError>;

    /// Task ids in insertion order.
    async fn task_ids(&self, run_id: String) -> Result<Vec<String>, StorageError>;
}

#[async_trait]
impl<T> StorageManager for T
where
    T: RecordStore,
{
    async fn save_task(&self, run_id: &str, task: &Task) -> Result<(), StorageError> {
        let blob = encode(task, "encode task")?;
        self.put(task_key(run_id, &task.id), blob).await
    }

    async fn get_task(&self, run_id: &str, task_id: &str) -> Result<Task, StorageError> {
        let key = task_key(run_id, task_id);
        let blob = self
            .fetch(key.clone())
            .await?
            .ok_or(StorageError::NotFound { key })?;
        decode(&blob, "decode task")
    }

    async fn save_job(&self, job: &Job) -> Result<(), StorageError> {
        let mut header = job.clone();
        header.tasks.clear();
        let blob = encode(&header, "encode job")?;
        self.put(job_key(&job.run_id), blob).await?;

        for task in &job.tasks {
            self.save_task(&job.run_id, task).await?;
            self.add_task_id(job.run_id.clone(), task.id.clone()).await?;
        }
        Ok(())
    }

    async fn get_job(&self, run_id: &str) -> Result<Job, StorageError> {
        let key = job_key(run_id);
        let blob = self
            .fetch(key.clone())
            .await?
            .ok_or(StorageError::NotFound { key })?;
        let mut job: Job = decode(&blob, "decode job")?;

        let task_ids = self.task_ids(run_id.to_owned()).await?;
        job.tasks = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            job.tasks.push(self.get_task(run_id, &task_id).await?);
        }
        Ok(job)
    }
}

fn encode<V: Serialize>(value: &V, context: &'static str) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialize {
        context,
        source: err,
    })
}

fn decode<V: DeserializeOwned>(blob: &str, context: &'static str) -> Result<V, StorageError> {
    serde_json::from_str(blob).map_err(|err| StorageError::Deserialize {
        context,
        source: err,
    })
}
