use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned unexpected status {status}: {body}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
    #[error("Gave up waiting for the start barrier after {waited:?}.")]
    BarrierTimeout { waited: Duration },
}
