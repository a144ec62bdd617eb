use std::time::Duration;

use crate::args::PositiveUsize;

/// Environment handed to every runner the orchestrator starts.
pub const ENV_CONCURRENCY: &str = "BENCH_CONCURRENCY";
pub const ENV_URL: &str = "BENCH_URL";
pub const ENV_DURATION: &str = "BENCH_DURATION";
pub const ENV_TIMEOUT: &str = "BENCH_TIMEOUT";
pub const ENV_RUN_ID: &str = "BENCH_RUN_ID";
pub const ENV_RUNNER_ID: &str = "BENCH_RUNNER_ID";
pub const ENV_API_URL: &str = "BENCH_API_URL";

/// Longest per-request timeout a runner will honor.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(2);

/// What one runner does: `concurrency` workers against `url` for `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub concurrency: PositiveUsize,
    pub url: String,
    pub duration: Duration,
    pub timeout: Duration,
}

impl RunSettings {
    /// The timeout is clamped into `(0, MAX_TIMEOUT]`.
    #[must_use]
    pub fn new(concurrency: PositiveUsize, url: String, duration: Duration, timeout: Duration) -> Self {
        Self {
            concurrency,
            url,
            duration,
            timeout: clamp_timeout(timeout),
        }
    }
}

/// Zero or anything above [`MAX_TIMEOUT`] becomes [`MAX_TIMEOUT`].
#[must_use]
pub fn clamp_timeout(timeout: Duration) -> Duration {
    if timeout.is_zero() || timeout > MAX_TIMEOUT {
        MAX_TIMEOUT
    } else {
        timeout
    }
}
