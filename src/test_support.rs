//! Shared fixtures for unit tests.
use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult, HttpError};

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

/// Multi-threaded variant for tests that need workers to run in parallel.
pub(crate) fn run_async_test_multi<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

/// Wraps a reqwest failure raised by test code itself.
pub(crate) fn request_failed(err: reqwest::Error) -> AppError {
    AppError::http(HttpError::RequestFailed {
        endpoint: "test request",
        source: err,
    })
}

/// Tiny HTTP target answering every request with a fixed status.
pub(crate) struct MockTarget {
    pub(crate) url: String,
    task: JoinHandle<()>,
}

impl Drop for MockTarget {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub(crate) async fn spawn_mock_target(status: u16, delay: Duration) -> AppResult<MockTarget> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| AppError::validation(format!("Failed to bind mock target: {}", err)))?;
    let addr = listener
        .local_addr()
        .map_err(|err| AppError::validation(format!("Failed to read mock addr: {}", err)))?;

    let task = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(handle_client(stream, status, delay));
        }
    });

    Ok(MockTarget {
        url: format!("http://{}/", addr),
        task,
    })
}

async fn handle_client(mut stream: TcpStream, status: u16, delay: Duration) {
    let mut buffer = [0u8; 1024];
    if stream.read(&mut buffer).await.is_err() {
        return;
    }
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
        status
    );
    if stream.write_all(response.as_bytes()).await.is_err() {
        return;
    }
    drop(stream.shutdown().await);
}
