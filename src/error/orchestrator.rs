use thiserror::Error;

use super::{ContainerError, MetricsError, StorageError, ValidationError};

/// Status used when a run exists but at least one runner has not reported.
pub const STATUS_NOT_DONE: u16 = 403;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("error starting container for runner {runner_id}: {source}")]
    StartContainer {
        runner_id: String,
        #[source]
        source: ContainerError,
    },
    #[error("error getting logs for {id}: {source}")]
    Logs {
        id: String,
        #[source]
        source: ContainerError,
    },
    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StorageError,
    },
    #[error("{context}: {source}")]
    Histogram {
        context: &'static str,
        #[source]
        source: MetricsError,
    },
    #[error("error decoding body: {source}")]
    DecodeBody {
        #[source]
        source: serde_json::Error,
    },
    #[error("error encoding {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("job not done")]
    JobNotDone { run_id: String },
    #[error("Bind error on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

impl OrchestratorError {
    /// HTTP status the control surface answers with for this error.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::JobNotDone { .. } => STATUS_NOT_DONE,
            Self::StartContainer { .. }
            | Self::Logs { .. }
            | Self::Storage { .. }
            | Self::Histogram { .. }
            | Self::DecodeBody { .. }
            | Self::Serialize { .. }
            | Self::Bind { .. }
            | Self::Io { .. } => 500,
            #[cfg(test)]
            Self::TestExpectation { .. } | Self::TestExpectationValue { .. } => 500,
        }
    }

    pub(crate) const fn storage(context: &'static str, source: StorageError) -> Self {
        Self::Storage { context, source }
    }
}
