//! The orchestrator: partitions runs into tasks, starts runners and merges
//! their results behind a small HTTP surface.
mod http;
mod merge;
mod partition;
mod request;
mod server;
mod service;


pub use merge::{JobReport, merge_job};
pub use partition::partition_concurrency;
pub use request::{MAX_CONCURRENCY, StartRequest, required};
pub use server::{bind, serve};
pub use service::Orchestrator;
