use std::path::PathBuf;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("swarmbench/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
pub(crate) const DEFAULT_MAX_PER_CONTAINER: &str = "100";
pub(crate) const DEFAULT_STARTUP_DELAY: &str = "10s";
pub(crate) const DEFAULT_POLL_INTERVAL: &str = "1s";

pub(crate) fn default_log_dir() -> String {
    default_base_dir()
        .join("logs")
        .to_string_lossy()
        .into_owned()
}

pub(crate) fn default_sqlite_path() -> String {
    default_base_dir()
        .join("swarmbench.db")
        .to_string_lossy()
        .into_owned()
}

fn default_base_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".swarmbench");
    }

    PathBuf::from(".swarmbench")
}
