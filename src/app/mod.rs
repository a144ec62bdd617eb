//! What each subcommand does once its arguments are resolved.
mod local;
mod orchestrator;
mod runner;

pub(crate) use local::run_local;
pub(crate) use orchestrator::run_orchestrator;
pub(crate) use runner::run_runner;
