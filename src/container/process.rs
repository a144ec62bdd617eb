use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ContainerError;

use super::ContainerManager;

const ID_PREFIX: &str = "proc-";
const RUNNER_SUBCOMMAND: &str = "runner";

/// Starts each runner as a child process of the orchestrator.
///
/// stdout and stderr of every child go to `<log_dir>/<id>.log`.
#[derive(Debug, Clone)]
pub struct ProcessContainerManager {
    program: PathBuf,
    log_dir: PathBuf,
}

impl ProcessContainerManager {
    #[must_use]
    pub const fn new(program: PathBuf, log_dir: PathBuf) -> Self {
        Self { program, log_dir }
    }

    #[must_use]
    pub fn log_path(&self, id: &str) -> PathBuf {
        self.log_dir.join(format!("{}.log", id))
    }
}

#[async_trait]
impl ContainerManager for ProcessContainerManager {
    async fn start_container(
        &self,
        env: BTreeMap<String, String>,
    ) -> Result<String, ContainerError> {
        let id = format!("{}{}", ID_PREFIX, Uuid::new_v4());
        let log_path = self.log_path(&id);
        let (stdout, stderr) = open_log(&self.log_dir, &log_path)?;

        let mut child = Command::new(&self.program)
            .arg(RUNNER_SUBCOMMAND)
            .envs(&env)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|err| ContainerError::Spawn {
                program: self.program.clone(),
                source: err,
            })?;
        info!("Started runner {} (pid {:?}).", id, child.id());

        let reaped_id = id.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => info!("Runner {} exited.", reaped_id),
                Ok(status) => warn!("Runner {} exited with {}.", reaped_id, status),
                Err(err) => warn!("Failed to wait for runner {}: {}", reaped_id, err),
            }
        });

        Ok(id)
    }

    async fn get_logs(&self, id: &str) -> Result<String, ContainerError> {
        if !is_process_id(id) {
            return Err(ContainerError::UnknownContainer { id: id.to_owned() });
        }
        let path = self.log_path(id);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| ContainerError::ReadLogs { path, source: err })
    }
}

fn open_log(log_dir: &Path, log_path: &Path) -> Result<(File, File), ContainerError> {
    std::fs::create_dir_all(log_dir).map_err(|err| ContainerError::CreateLogFile {
        path: log_dir.to_path_buf(),
        source: err,
    })?;
    let stdout = File::create(log_path).map_err(|err| ContainerError::CreateLogFile {
        path: log_path.to_path_buf(),
        source: err,
    })?;
    let stderr = stdout
        .try_clone()
        .map_err(|err| ContainerError::CreateLogFile {
            path: log_path.to_path_buf(),
            source: err,
        })?;
    Ok((stdout, stderr))
}

/// Ids are used as file names, so only accept what this manager hands out.
fn is_process_id(id: &str) -> bool {
    id.strip_prefix(ID_PREFIX).is_some_and(|rest| {
        !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_hexdigit() || ch == '-')
    })
}
