//! The per-process run lifecycle: settings, engine and the orchestrator client.
mod client;
mod engine;
mod session;
mod settings;


pub use client::OrchestratorClient;
pub use engine::{OUTCOME_QUEUE_CAPACITY, Runner};
pub use session::{BarrierTiming, run_session};
pub use settings::{
    ENV_API_URL, ENV_CONCURRENCY, ENV_DURATION, ENV_RUN_ID, ENV_RUNNER_ID, ENV_TIMEOUT, ENV_URL,
    MAX_TIMEOUT, RunSettings, clamp_timeout,
};
