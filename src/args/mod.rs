//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{Cli, Command, LocalArgs, OrchestratorArgs, RunnerArgs};
pub use parsers::{format_duration, parse_duration_value};
pub use types::{ContainerBackend, PositiveUsize, StorageBackend};

pub(crate) use defaults::DEFAULT_USER_AGENT;
