use std::path::PathBuf;

use serde::Deserialize;

use crate::args::{ContainerBackend, StorageBackend};

/// Orchestrator settings read from `swarmbench.toml` or `swarmbench.json`.
///
/// Every field mirrors the flag of the same name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ConfigFile {
    pub listen: Option<String>,
    pub max_per_container: Option<usize>,
    pub public_url: Option<String>,
    pub storage: Option<StorageBackend>,
    pub sqlite_path: Option<String>,
    pub container: Option<ContainerBackend>,
    pub runner_binary: Option<PathBuf>,
    pub log_dir: Option<String>,
}
