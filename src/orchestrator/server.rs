use std::sync::Arc;

use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::domain::{BarrierState, RunResult};
use crate::error::OrchestratorError;
use crate::shutdown::ShutdownReceiver;

use super::http::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT, HttpRequest, read_http_request, write_response,
};
use super::request::{StartRequest, required};
use super::service::Orchestrator;

struct Response {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Response {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: body.into().into_bytes(),
        }
    }

    fn empty(status: u16) -> Self {
        Self::text(status, "")
    }

    fn json<T: Serialize>(
        status: u16,
        context: &'static str,
        value: &T,
    ) -> Result<Self, OrchestratorError> {
        let body = serde_json::to_vec(value)
            .map_err(|err| OrchestratorError::Serialize { context, source: err })?;
        Ok(Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        })
    }
}

/// # Errors
///
/// Returns an error when the address cannot be bound.
pub async fn bind(listen: &str) -> Result<TcpListener, OrchestratorError> {
    TcpListener::bind(listen)
        .await
        .map_err(|err| OrchestratorError::Bind {
            addr: listen.to_owned(),
            source: err,
        })
}

/// Serves the control surface until shutdown is broadcast.
pub async fn serve(
    listener: TcpListener,
    orchestrator: Arc<Orchestrator>,
    mut shutdown_rx: ShutdownReceiver,
) {
    match listener.local_addr() {
        Ok(addr) => info!("Orchestrator listening on {}", addr),
        Err(err) => warn!("Orchestrator listening on unknown address: {}", err),
    }
    loop {
        let accepted = tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Orchestrator shutting down.");
                break;
            }
            accepted = listener.accept() => accepted,
        };
        let (socket, peer) = match accepted {
            Ok(result) => result,
            Err(err) => {
                warn!("Failed to accept connection: {}", err);
                continue;
            }
        };
        debug!("Connection from {}", peer);
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            handle_connection(socket, &orchestrator).await;
        });
    }
}

async fn handle_connection(mut socket: TcpStream, orchestrator: &Orchestrator) {
    let request = match read_http_request(&mut socket).await {
        Ok(request) => request,
        Err(err) => {
            debug!("Rejected request: {} {}", err.status, err.message);
            respond(&mut socket, &Response::text(err.status, err.message)).await;
            return;
        }
    };

    let response = match route(orchestrator, &request).await {
        Ok(response) => response,
        Err(err) => {
            let status = err.status();
            if status >= 500 {
                error!("{} {} failed: {}", request.method, request.path, err);
            } else {
                debug!("{} {} -> {}: {}", request.method, request.path, status, err);
            }
            Response::text(status, err.to_string())
        }
    };
    respond(&mut socket, &response).await;
}

async fn respond(socket: &mut TcpStream, response: &Response) {
    if write_response(
        socket,
        response.status,
        response.content_type,
        &response.body,
    )
    .await
    .is_err()
    {
        // Socket closed while writing response.
    }
}

async fn route(
    orchestrator: &Orchestrator,
    request: &HttpRequest,
) -> Result<Response, OrchestratorError> {
    let query = &request.query;
    match request.path.as_str() {
        "/health" => Ok(Response::text(200, "ok")),
        "/start" => {
            let start = StartRequest::from_query(query, &request.body)?;
            let job = orchestrator.start(start).await?;
            Response::json(200, "job", &job)
        }
        "/readyToStart" => {
            let run_id = required(query, "runId")?;
            let runner_id = required(query, "runnerId")?;
            orchestrator.ready_to_start(run_id, runner_id).await?;
            Ok(Response::empty(200))
        }
        "/waitForStart" => {
            let run_id = required(query, "runId")?;
            match orchestrator.wait_for_start(run_id).await? {
                BarrierState::Proceed => Ok(Response::empty(200)),
                BarrierState::KeepWaiting => Ok(Response::empty(202)),
            }
        }
        "/reportResult" => {
            if request.method != "POST" {
                return Ok(Response::text(405, "method not allowed"));
            }
            let run_id = required(query, "runId")?;
            let runner_id = required(query, "runnerId")?;
            let result: RunResult = serde_json::from_slice(&request.body)
                .map_err(|err| OrchestratorError::DecodeBody { source: err })?;
            orchestrator.report_result(run_id, runner_id, result).await?;
            Ok(Response::empty(200))
        }
        "/result" => {
            let report = orchestrator.result(required(query, "runId")?).await?;
            Response::json(200, "job report", &report)
        }
        "/logs" => {
            let logs = orchestrator.logs(required(query, "runnerId")?).await?;
            Ok(Response::text(200, logs))
        }
        "/tasks" => {
            let tasks = orchestrator.tasks(required(query, "runId")?).await?;
            Response::json(200, "tasks", &tasks)
        }
        _ => Ok(Response::text(404, "Not found")),
    }
}
