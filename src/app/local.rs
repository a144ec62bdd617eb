use std::sync::Arc;

use serde::Serialize;

use crate::args::LocalArgs;
use crate::domain::RunResult;
use crate::error::AppResult;
use crate::http::RandomIntReplacer;
use crate::metrics::{HistogramSummary, LatencyHistogram};
use crate::runner::{RunSettings, Runner};

#[derive(Debug, Serialize)]
struct LocalReport {
    result: RunResult,
    summary: HistogramSummary,
}

/// Runs the engine in-process and prints the result as JSON.
pub(crate) async fn run_local(args: LocalArgs) -> AppResult<()> {
    let settings = RunSettings::new(args.concurrency, args.url, args.duration, args.timeout);
    let runner = Runner::new(&settings, Arc::new(RandomIntReplacer::new(args.random_max)))?;

    let result = runner.run().await?;
    let histogram = LatencyHistogram::from_snapshot(&result.histogram)?;
    let report = LocalReport {
        summary: HistogramSummary::from_histogram(&histogram),
        result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
