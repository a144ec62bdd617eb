use super::records::RecordStore;
use super::*;
use crate::error::{AppError, AppResult, StorageError};
use crate::test_support::run_async_test;
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;
use tempfile::tempdir;

fn sample_job(run_id: &str, task_ids: &[&str]) -> Job {
    Job {
        run_id: run_id.to_owned(),
        concurrency: task_ids.len(),
        duration: Duration::from_secs(1),
        timeout: Duration::from_millis(100),
        url: "https://example.com".to_owned(),
        meta: BTreeMap::from([("team".to_owned(), "perf".to_owned())]),
        request_time: Utc::now(),
        start_time: None,
        end_time: None,
        tasks: task_ids
            .iter()
            .map(|id| Task::new((*id).to_owned(), format!("container-{}", id), 1))
            .collect(),
    }
}

async fn exercise_layout<S>(storage: &S) -> AppResult<()>
where
    S: StorageManager + RecordStore,
{
    let job = sample_job("run-a", &["zeta", "alpha", "mid"]);
    storage.save_job(&job).await?;
    storage.save_job(&job).await?;

    let loaded = storage.get_job("run-a").await?;
    if loaded != job {
        return Err(AppError::validation(format!(
            "Job changed across storage: {:?}",
            loaded
        )));
    }

    let header = storage
        .fetch(job_key("run-a"))
        .await?
        .ok_or_else(|| AppError::validation("Missing job blob"))?;
    let header: serde_json::Value = serde_json::from_str(&header)?;
    if header.get("tasks") != Some(&serde_json::json!([])) {
        return Err(AppError::validation(format!(
            "Job blob should not embed tasks: {}",
            header
        )));
    }
    if storage.task_ids("run-a".to_owned()).await? != ["zeta", "alpha", "mid"] {
        return Err(AppError::validation("Task index lost insertion order"));
    }

    let mut task = storage.get_task("run-a", "alpha").await?;
    task.ready = true;
    storage.save_task("run-a", &task).await?;

    let reloaded = storage.get_job("run-a").await?;
    let ready: Vec<bool> = reloaded.tasks.iter().map(|task| task.ready).collect();
    if ready != [false, true, false] {
        return Err(AppError::validation(format!("Unexpected ready flags: {:?}", ready)));
    }
    Ok(())
}

async fn exercise_missing<S>(storage: &S) -> AppResult<()>
where
    S: StorageManager,
{
    let job = storage.get_job("nope").await;
    if !matches!(&job, Err(StorageError::NotFound { key }) if key == "JOB_nope") {
        return Err(AppError::validation(format!(
            "Expected NotFound for job, got {:?}",
            job
        )));
    }
    let task = storage.get_task("nope", "t").await;
    if !matches!(&task, Err(StorageError::NotFound { key }) if key == "JOB_nope_TASK_t") {
        return Err(AppError::validation(format!(
            "Expected NotFound for task, got {:?}",
            task
        )));
    }
    Ok(())
}

#[test]
fn key_layout() -> AppResult<()> {
    if job_key("r") != "JOB_r" || task_key("r", "t") != "JOB_r_TASK_t" || task_index_key("r") != "JOB_r_TASKS"
    {
        return Err(AppError::validation("Unexpected key layout"));
    }
    Ok(())
}

#[test]
fn memory_storage_round_trips_jobs() -> AppResult<()> {
    run_async_test(async {
        let storage = MemoryStorage::new();
        exercise_layout(&storage).await?;
        exercise_missing(&storage).await
    })
}

#[test]
fn sqlite_storage_round_trips_jobs() -> AppResult<()> {
    run_async_test(async {
        let storage = SqliteStorage::open_in_memory().await?;
        exercise_layout(&storage).await?;
        exercise_missing(&storage).await
    })
}

#[test]
fn sqlite_storage_survives_reopen() -> AppResult<()> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| AppError::validation(format!("tempdir failed: {}", err)))?;
        let path = dir.path().join("records.db");

        {
            let storage = SqliteStorage::open(&path).await?;
            storage.save_job(&sample_job("run-b", &["t1", "t2"])).await?;
        }

        let storage = SqliteStorage::open(&path).await?;
        let job = storage.get_job("run-b").await?;
        let ids: Vec<&str> = job.tasks.iter().map(|task| task.id.as_str()).collect();
        if ids != ["t1", "t2"] {
            return Err(AppError::validation(format!("Unexpected tasks: {:?}", ids)));
        }
        Ok(())
    })
}
