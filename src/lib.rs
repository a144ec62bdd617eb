//! Core library for the `swarmbench` CLI.
//!
//! An orchestrator splits a closed-workload HTTP benchmark into tasks, starts
//! one runner per task through a [`container::ContainerManager`], holds every
//! runner at a start barrier and merges their latency histograms on demand.
//! Jobs and tasks live behind a [`storage::StorageManager`]. The primary
//! user-facing interface is the `swarmbench` binary; these modules back it.
pub mod args;
pub mod config;
pub mod container;
pub mod domain;
pub mod error;
pub mod http;
pub mod metrics;
pub mod orchestrator;
pub mod runner;
pub mod shutdown;
pub mod storage;

#[cfg(test)]
mod test_support;
