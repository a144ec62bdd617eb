use super::*;
use crate::error::{AppError, AppResult, ContainerError};
use crate::test_support::run_async_test;
use std::time::Duration;
use tempfile::tempdir;

fn env_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

#[test]
fn in_memory_manager_records_starts_in_order() -> AppResult<()> {
    run_async_test(async {
        let manager = InMemoryContainerManager::new();
        let first = manager.start_container(env_of(&[("BENCH_CONCURRENCY", "2")])).await?;
        let second = manager.start_container(env_of(&[("BENCH_CONCURRENCY", "1")])).await?;
        if first == second {
            return Err(AppError::validation("Container ids must be unique"));
        }

        let started = manager.started().await;
        let shares: Vec<Option<&str>> = started
            .iter()
            .map(|(_, env)| env.get("BENCH_CONCURRENCY").map(String::as_str))
            .collect();
        if shares != [Some("2"), Some("1")] {
            return Err(AppError::validation(format!("Unexpected envs: {:?}", shares)));
        }

        manager.append_log(&first, "hello").await;
        manager.append_log(&first, "world").await;
        if manager.get_logs(&first).await? != "hello\nworld\n" {
            return Err(AppError::validation("Logs should keep line order"));
        }
        if !manager.get_logs(&second).await?.is_empty() {
            return Err(AppError::validation("Fresh container should have empty logs"));
        }
        Ok(())
    })
}

#[test]
fn in_memory_manager_rejects_after_limit() -> AppResult<()> {
    run_async_test(async {
        let manager = InMemoryContainerManager::new();
        manager.reject_after(1).await;
        manager.start_container(BTreeMap::new()).await?;
        let rejected = manager.start_container(BTreeMap::new()).await;
        if !matches!(rejected, Err(ContainerError::Rejected { .. })) {
            return Err(AppError::validation(format!(
                "Expected rejection, got {:?}",
                rejected
            )));
        }
        if manager.started().await.len() != 1 {
            return Err(AppError::validation("Rejected start must not be recorded"));
        }
        if manager.get_logs("missing").await.is_ok() {
            return Err(AppError::validation("Unknown id should fail"));
        }
        Ok(())
    })
}

#[cfg(unix)]
#[test]
fn process_manager_captures_child_output() -> AppResult<()> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| AppError::validation(format!("tempdir failed: {}", err)))?;
        let manager = ProcessContainerManager::new("echo".into(), dir.path().join("logs"));

        let id = manager
            .start_container(env_of(&[("BENCH_RUN_ID", "run-1")]))
            .await?;
        if !id.starts_with("proc-") {
            return Err(AppError::validation(format!("Unexpected id {}", id)));
        }

        let mut logs = String::new();
        for _ in 0..50 {
            logs = manager.get_logs(&id).await?;
            if !logs.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        if logs.trim() != "runner" {
            return Err(AppError::validation(format!("Unexpected logs: {:?}", logs)));
        }
        Ok(())
    })
}

#[test]
fn process_manager_refuses_foreign_ids() -> AppResult<()> {
    run_async_test(async {
        let dir = tempdir().map_err(|err| AppError::validation(format!("tempdir failed: {}", err)))?;
        let manager = ProcessContainerManager::new("echo".into(), dir.path().to_path_buf());
        for id in ["../secret", "proc-", "proc-../../x", "mem-1"] {
            let result = manager.get_logs(id).await;
            if !matches!(result, Err(ContainerError::UnknownContainer { .. })) {
                return Err(AppError::validation(format!(
                    "Expected {} to be refused, got {:?}",
                    id, result
                )));
            }
        }
        Ok(())
    })
}
