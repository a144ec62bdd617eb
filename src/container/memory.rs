use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ContainerError;

use super::ContainerManager;

#[derive(Debug, Default)]
struct InMemoryState {
    started: Vec<(String, BTreeMap<String, String>)>,
    logs: HashMap<String, String>,
    reject_after: Option<usize>,
}

/// Records start requests without launching anything.
///
/// Used when runners are started out of band, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryContainerManager {
    state: Mutex<InMemoryState>,
}

impl InMemoryContainerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `count` more starts, then reject every following one.
    pub async fn reject_after(&self, count: usize) {
        self.state.lock().await.reject_after = Some(count);
    }

    /// Ids and environments of every accepted start, in order.
    pub async fn started(&self) -> Vec<(String, BTreeMap<String, String>)> {
        self.state.lock().await.started.clone()
    }

    pub async fn append_log(&self, id: &str, line: &str) {
        let mut state = self.state.lock().await;
        let log = state.logs.entry(id.to_owned()).or_default();
        log.push_str(line);
        log.push('\n');
    }
}

#[async_trait]
impl ContainerManager for InMemoryContainerManager {
    async fn start_container(
        &self,
        env: BTreeMap<String, String>,
    ) -> Result<String, ContainerError> {
        let mut state = self.state.lock().await;
        if let Some(remaining) = state.reject_after {
            if remaining == 0 {
                return Err(ContainerError::Rejected {
                    message: "capacity exhausted".to_owned(),
                });
            }
            state.reject_after = Some(remaining.saturating_sub(1));
        }

        let id = format!("mem-{}", state.started.len().saturating_add(1));
        state.logs.insert(id.clone(), String::new());
        state.started.push((id.clone(), env));
        Ok(id)
    }

    async fn get_logs(&self, id: &str) -> Result<String, ContainerError> {
        self.state
            .lock()
            .await
            .logs
            .get(id)
            .cloned()
            .ok_or_else(|| ContainerError::UnknownContainer { id: id.to_owned() })
    }
}
