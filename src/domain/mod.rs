//! Records shared between the orchestrator, the storage layer and runners.
mod job;
mod result;
pub(crate) mod serde_time;


pub use job::{BarrierState, Job, JobPhase, Task};
pub use result::RunResult;
