//! Starting runners and collecting their logs.
mod memory;
mod process;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::ContainerError;

pub use memory::InMemoryContainerManager;
pub use process::ProcessContainerManager;

/// Starts one compute unit per task and serves its logs.
#[async_trait]
pub trait ContainerManager: Send + Sync + std::fmt::Debug {
    /// Starts a runner with `env` and returns an id usable with
    /// [`ContainerManager::get_logs`].
    async fn start_container(&self, env: BTreeMap<String, String>)
    -> Result<String, ContainerError>;

    /// Complete log text, oldest line first.
    async fn get_logs(&self, id: &str) -> Result<String, ContainerError>;
}
