use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Failed to spawn runner '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to create log file '{path}': {source}")]
    CreateLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read logs '{path}': {source}")]
    ReadLogs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown container '{id}'.")]
    UnknownContainer { id: String },
    #[error("Container scheduling rejected: {message}")]
    Rejected { message: String },
}
