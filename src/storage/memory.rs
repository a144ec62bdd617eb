use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;

use super::keys::task_index_key;
use super::records::RecordStore;

#[derive(Debug, Default)]
struct MemoryState {
    records: HashMap<String, String>,
    indexes: HashMap<String, Vec<String>>,
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStorage {
    async fn put(&self, key: String, value: String) -> Result<(), StorageError> {
        self.state.write().await.records.insert(key, value);
        Ok(())
    }

    async fn fetch(&self, key: String) -> Result<Option<String>, StorageError> {
        Ok(self.state.read().await.records.get(&key).cloned())
    }

    async fn add_task_id(&self, run_id: String, task_id: String) -> Result<(), StorageError> {
        let mut state = self.state.write().await;
        let members = state.indexes.entry(task_index_key(&run_id)).or_default();
        if !members.contains(&task_id) {
            members.push(task_id);
        }
        Ok(())
    }

    async fn task_ids(&self, run_id: String) -> Result<Vec<String>, StorageError> {
        Ok(self
            .state
            .read()
            .await
            .indexes
            .get(&task_index_key(&run_id))
            .cloned()
            .unwrap_or_default())
    }
}
