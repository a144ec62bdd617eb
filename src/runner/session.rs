use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::domain::RunResult;
use crate::error::AppResult;

use super::client::OrchestratorClient;
use super::engine::Runner;

/// How a runner paces itself around the start barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierTiming {
    /// Settle time before signaling ready.
    pub startup_delay: Duration,
    pub poll_interval: Duration,
    /// `None` waits for the barrier forever.
    pub deadline: Option<Duration>,
}

/// Full runner lifecycle: settle, signal ready, wait for the barrier, run,
/// report.
///
/// # Errors
///
/// Returns the first protocol or engine failure; nothing is reported in that
/// case.
pub async fn run_session(
    client: &OrchestratorClient,
    runner: &Runner,
    timing: BarrierTiming,
) -> AppResult<RunResult> {
    if !timing.startup_delay.is_zero() {
        info!("Settling for {:?} before signaling ready.", timing.startup_delay);
        sleep(timing.startup_delay).await;
    }

    client.ready_to_start().await?;
    info!("Signaled ready; waiting for the start barrier.");

    client
        .wait_for_start(timing.poll_interval, timing.deadline)
        .await?;

    let result = runner.run().await?;

    client.report_result(&result).await?;
    info!("Result reported.");
    Ok(result)
}
