mod app;
mod args;
mod config;
mod container;
mod domain;
mod entry;
mod error;
mod http;
mod logger;
mod metrics;
mod orchestrator;
mod runner;
mod shutdown;
mod storage;

#[cfg(test)]
mod test_support;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
