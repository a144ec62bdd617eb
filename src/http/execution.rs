use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::time::Instant;
use tracing::debug;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;
use crate::metrics::{RequestErrorKind, RequestOutcome, hundred_micros};

/// Builds the client shared by every worker of a runner.
///
/// # Errors
///
/// Returns an error when reqwest cannot initialize its TLS backend.
pub fn build_target_client(timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .connect_timeout(timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}

/// Issues one GET and measures it from dispatch until the body is drained.
///
/// Failures are folded into the outcome; this never returns an error.
pub async fn execute_get(client: &Client, url: &str, timeout: Duration) -> RequestOutcome {
    let started = Instant::now();
    let (status_code, bytes, error) = match client.get(url).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            match drain_response_body(response).await {
                Ok(bytes) => (status, bytes, None),
                Err(err) => {
                    debug!("Failed to read response body from {}: {}", url, err);
                    (status, 0, Some(classify_error(&err)))
                }
            }
        }
        Err(err) => {
            debug!("Request to {} failed: {}", url, err);
            (0, 0, Some(classify_error(&err)))
        }
    };

    RequestOutcome {
        status_code,
        duration: hundred_micros(started.elapsed()),
        bytes,
        error,
    }
}

#[must_use]
pub(crate) fn classify_error(err: &reqwest::Error) -> RequestErrorKind {
    if err.is_timeout() {
        RequestErrorKind::Timeout
    } else if err.is_builder() {
        RequestErrorKind::Validation
    } else if err.is_decode() || err.is_body() {
        RequestErrorKind::Decode
    } else {
        RequestErrorKind::Network
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
