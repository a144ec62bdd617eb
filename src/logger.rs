use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// `SWARMBENCH_LOG` wins over `RUST_LOG`; without either the level follows
/// `verbose`. Later calls are no-ops.
pub fn init_logging(verbose: bool, ansi: bool) {
    let filter = std::env::var("SWARMBENCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global subscriber already installed.");
    }
}
