use std::sync::Arc;

use tracing::info;

use crate::args::RunnerArgs;
use crate::error::AppResult;
use crate::http::RandomIntReplacer;
use crate::runner::{BarrierTiming, OrchestratorClient, RunSettings, Runner, run_session};

pub(crate) async fn run_runner(args: RunnerArgs) -> AppResult<()> {
    let settings = RunSettings::new(args.concurrency, args.url, args.duration, args.timeout);
    info!(
        "Runner {} of run {}: {} workers against {} for {:?}, timeout {:?}.",
        args.runner_id,
        args.run_id,
        settings.concurrency.get(),
        settings.url,
        settings.duration,
        settings.timeout
    );

    let runner = Runner::new(&settings, Arc::new(RandomIntReplacer::new(args.random_max)))?;
    let client = OrchestratorClient::new(&args.api_url, args.run_id, args.runner_id)?;
    let timing = BarrierTiming {
        startup_delay: args.startup_delay,
        poll_interval: args.poll_interval,
        deadline: args.barrier_timeout,
    };

    run_session(&client, &runner, timing).await?;
    Ok(())
}
