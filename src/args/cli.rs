use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::http::DEFAULT_RANDOM_MAX;

use super::defaults::{
    DEFAULT_LISTEN, DEFAULT_MAX_PER_CONTAINER, DEFAULT_POLL_INTERVAL, DEFAULT_STARTUP_DELAY,
    default_log_dir, default_sqlite_path,
};
use super::parsers::{parse_duration_arg, parse_duration_value, parse_positive_usize};
use super::types::{ContainerBackend, PositiveUsize, StorageBackend};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Distributed HTTP load testing: an orchestrator splits a run across runner processes, synchronizes their start and merges their latency histograms."
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true, env = "SWARMBENCH_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the orchestrator HTTP API
    Orchestrator(OrchestratorArgs),
    /// Run one runner: signal ready, wait for the barrier, generate load, report
    Runner(RunnerArgs),
    /// Generate load in-process and print the result (no orchestrator)
    Local(LocalArgs),
}

#[derive(Debug, Args, Clone)]
pub struct OrchestratorArgs {
    /// Address the HTTP API listens on
    #[arg(long, env = "SWARMBENCH_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Upper bound on the concurrency given to a single runner
    #[arg(
        long = "max-per-container",
        env = "SWARMBENCH_MAX_PER_CONTAINER",
        default_value = DEFAULT_MAX_PER_CONTAINER,
        value_parser = parse_positive_usize
    )]
    pub max_per_container: PositiveUsize,

    /// Base URL runners use to call back (defaults to one derived from --listen)
    #[arg(long = "public-url", env = "SWARMBENCH_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Record store for jobs and tasks
    #[arg(long, value_enum, env = "SWARMBENCH_STORAGE", default_value_t = StorageBackend::Memory)]
    pub storage: StorageBackend,

    /// SQLite database file (with --storage sqlite)
    #[arg(long = "sqlite-path", env = "SWARMBENCH_SQLITE_PATH", default_value_t = default_sqlite_path())]
    pub sqlite_path: String,

    /// How runners are started
    #[arg(long, value_enum, env = "SWARMBENCH_CONTAINER", default_value_t = ContainerBackend::Process)]
    pub container: ContainerBackend,

    /// Runner executable (defaults to this binary)
    #[arg(long = "runner-binary", env = "SWARMBENCH_RUNNER_BINARY")]
    pub runner_binary: Option<PathBuf>,

    /// Directory receiving one log file per runner
    #[arg(long = "log-dir", env = "SWARMBENCH_LOG_DIR", default_value_t = default_log_dir())]
    pub log_dir: String,

    /// Path to config file (TOML/JSON)
    #[arg(long, short, env = "SWARMBENCH_CONFIG")]
    pub config: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct RunnerArgs {
    /// Number of concurrent workers
    #[arg(long, env = "BENCH_CONCURRENCY", value_parser = parse_positive_usize)]
    pub concurrency: PositiveUsize,

    /// Target URL; `{random}` is replaced per request
    #[arg(long, env = "BENCH_URL")]
    pub url: String,

    /// How long each worker keeps issuing requests (supports us/ms/s/m/h)
    #[arg(long, env = "BENCH_DURATION", value_parser = parse_duration_arg)]
    pub duration: Duration,

    /// Per-request timeout; 0 or anything above 2s becomes 2s
    #[arg(long, env = "BENCH_TIMEOUT", value_parser = parse_duration_value)]
    pub timeout: Duration,

    /// Run this runner belongs to
    #[arg(long = "run-id", env = "BENCH_RUN_ID")]
    pub run_id: String,

    /// Task id assigned by the orchestrator
    #[arg(long = "runner-id", env = "BENCH_RUNNER_ID")]
    pub runner_id: String,

    /// Orchestrator base URL
    #[arg(long = "api-url", env = "BENCH_API_URL")]
    pub api_url: String,

    /// Settle time before signaling ready
    #[arg(
        long = "startup-delay",
        env = "BENCH_STARTUP_DELAY",
        default_value = DEFAULT_STARTUP_DELAY,
        value_parser = parse_duration_value
    )]
    pub startup_delay: Duration,

    /// Interval between start barrier polls
    #[arg(
        long = "poll-interval",
        env = "BENCH_POLL_INTERVAL",
        default_value = DEFAULT_POLL_INTERVAL,
        value_parser = parse_duration_arg
    )]
    pub poll_interval: Duration,

    /// Give up on the start barrier after this long (waits forever if unset)
    #[arg(long = "barrier-timeout", env = "BENCH_BARRIER_TIMEOUT", value_parser = parse_duration_arg)]
    pub barrier_timeout: Option<Duration>,

    /// Exclusive upper bound for `{random}` substitutions
    #[arg(long = "random-max", env = "BENCH_RANDOM_MAX", default_value_t = DEFAULT_RANDOM_MAX)]
    pub random_max: u64,
}

#[derive(Debug, Args, Clone)]
pub struct LocalArgs {
    /// Number of concurrent workers
    #[arg(long, short = 'c', value_parser = parse_positive_usize)]
    pub concurrency: PositiveUsize,

    /// Run duration (supports us/ms/s/m/h)
    #[arg(long, short = 'd', value_parser = parse_duration_arg)]
    pub duration: Duration,

    /// Per-request timeout; 0 or anything above 2s becomes 2s
    #[arg(long, short = 't', default_value = "2s", value_parser = parse_duration_value)]
    pub timeout: Duration,

    /// Target URL; `{random}` is replaced per request
    #[arg(long, short = 'u')]
    pub url: String,

    /// Exclusive upper bound for `{random}` substitutions
    #[arg(long = "random-max", default_value_t = DEFAULT_RANDOM_MAX)]
    pub random_max: u64,
}
