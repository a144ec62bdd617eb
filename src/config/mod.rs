//! Orchestrator configuration files and how they merge with CLI flags.
mod apply;
mod loader;
pub mod types;


pub use apply::{apply_config, resolve_public_url};
pub use loader::{load_config, load_config_file};
