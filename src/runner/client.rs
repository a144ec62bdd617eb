use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::{Instant, sleep};
use tracing::{debug, info};
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::domain::{BarrierState, RunResult};
use crate::error::HttpError;

const READY_TO_START: &str = "readyToStart";
const WAIT_FOR_START: &str = "waitForStart";
const REPORT_RESULT: &str = "reportResult";

/// Runner side of the orchestrator protocol.
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    client: Client,
    base: Url,
    run_id: String,
    runner_id: String,
}

impl OrchestratorClient {
    /// # Errors
    ///
    /// Returns an error when `api_url` is not a valid URL or the client
    /// cannot be built.
    pub fn new(api_url: &str, run_id: String, runner_id: String) -> Result<Self, HttpError> {
        let mut base = Url::parse(api_url).map_err(|err| HttpError::InvalidUrl {
            url: api_url.to_owned(),
            source: err,
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self {
            client,
            base,
            run_id,
            runner_id,
        })
    }

    /// Tells the orchestrator this runner is ready.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-200 answer.
    pub async fn ready_to_start(&self) -> Result<(), HttpError> {
        let url = self.endpoint(READY_TO_START, true)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| HttpError::RequestFailed {
                endpoint: READY_TO_START,
                source: err,
            })?;
        expect_ok(READY_TO_START, response).await
    }

    /// Asks once whether every runner of the job is ready.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any status other than 200/202.
    pub async fn poll_start(&self) -> Result<BarrierState, HttpError> {
        let url = self.endpoint(WAIT_FOR_START, false)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| HttpError::RequestFailed {
                endpoint: WAIT_FOR_START,
                source: err,
            })?;
        match response.status() {
            StatusCode::OK => Ok(BarrierState::Proceed),
            StatusCode::ACCEPTED => Ok(BarrierState::KeepWaiting),
            _ => Err(unexpected_status(WAIT_FOR_START, response).await),
        }
    }

    /// Polls the start barrier every `poll` until it opens.
    ///
    /// Without a `deadline` this waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error when a poll fails or the deadline passes.
    pub async fn wait_for_start(
        &self,
        poll: Duration,
        deadline: Option<Duration>,
    ) -> Result<(), HttpError> {
        let started = Instant::now();
        loop {
            if self.poll_start().await? == BarrierState::Proceed {
                info!("Start barrier open after {:?}.", started.elapsed());
                return Ok(());
            }
            if let Some(limit) = deadline
                && started.elapsed() >= limit
            {
                return Err(HttpError::BarrierTimeout {
                    waited: started.elapsed(),
                });
            }
            debug!("Still waiting for other runners to be ready.");
            sleep(poll).await;
        }
    }

    /// Uploads this runner's result.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-200 answer.
    pub async fn report_result(&self, result: &RunResult) -> Result<(), HttpError> {
        let url = self.endpoint(REPORT_RESULT, true)?;
        let response = self
            .client
            .post(url)
            .json(result)
            .send()
            .await
            .map_err(|err| HttpError::RequestFailed {
                endpoint: REPORT_RESULT,
                source: err,
            })?;
        expect_ok(REPORT_RESULT, response).await
    }

    fn endpoint(&self, name: &str, with_runner: bool) -> Result<Url, HttpError> {
        let mut url = self.base.join(name).map_err(|err| HttpError::InvalidUrl {
            url: format!("{}{}", self.base, name),
            source: err,
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("runId", &self.run_id);
            if with_runner {
                query.append_pair("runnerId", &self.runner_id);
            }
        }
        Ok(url)
    }
}

async fn expect_ok(endpoint: &'static str, response: reqwest::Response) -> Result<(), HttpError> {
    if response.status() == StatusCode::OK {
        return Ok(());
    }
    Err(unexpected_status(endpoint, response).await)
}

async fn unexpected_status(endpoint: &'static str, response: reqwest::Response) -> HttpError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    HttpError::UnexpectedStatus {
        endpoint,
        status,
        body,
    }
}
