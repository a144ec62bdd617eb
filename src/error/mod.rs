mod app;
mod config;
mod container;
mod http;
mod metrics;
mod orchestrator;
mod storage;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use container::ContainerError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use orchestrator::{OrchestratorError, STATUS_NOT_DONE};
pub use storage::StorageError;
pub use validation::ValidationError;
