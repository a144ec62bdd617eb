use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Child, Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawn a lightweight HTTP target answering `200 OK` to everything.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server() -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    thread::spawn(move || handle_client(stream));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}/", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

fn handle_client(mut stream: TcpStream) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let mut buffer = [0u8; 1024];
    if stream.read(&mut buffer).is_err() {
        return;
    }
    if stream
        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK")
        .is_err()
    {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Kills the wrapped process when dropped.
pub struct ChildGuard(pub Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        drop(self.0.kill());
        drop(self.0.wait());
    }
}

/// Run the `swarmbench` binary to completion and capture its output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_swarmbench<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(swarmbench_bin()?)
        .args(args)
        .env("SWARMBENCH_LOG", "error")
        .output()
        .map_err(|err| format!("run swarmbench failed: {}", err))
}

/// Spawn the `swarmbench` binary with extra environment.
///
/// # Errors
///
/// Returns an error if the process cannot be started.
pub fn spawn_swarmbench<I, S>(args: I, envs: &[(&str, &str)]) -> Result<ChildGuard, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(swarmbench_bin()?);
    command
        .args(args)
        .env("SWARMBENCH_LOG", "info")
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    for (key, value) in envs {
        command.env(key, value);
    }
    command
        .spawn()
        .map(ChildGuard)
        .map_err(|err| format!("spawn swarmbench failed: {}", err))
}

/// Reserve a free local port.
///
/// # Errors
///
/// Returns an error if no port can be bound.
pub fn pick_port() -> Result<u16, String> {
    TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind port failed: {}", err))?
        .local_addr()
        .map_err(|err| format!("port addr failed: {}", err))
        .map(|addr| addr.port())
}

/// Poll `url` until it answers 200 or `timeout` passes.
///
/// # Errors
///
/// Returns an error when the deadline passes.
pub async fn wait_for_ok(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<reqwest::Response, String> {
    let start = Instant::now();
    loop {
        if let Ok(response) = client.get(url).send().await
            && response.status() == reqwest::StatusCode::OK
        {
            return Ok(response);
        }
        if start.elapsed() > timeout {
            return Err(format!("{} did not answer 200 within {:?}", url, timeout));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Build a runtime for async test bodies.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))
}

pub fn swarmbench_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_swarmbench").map_or_else(
        || Err("CARGO_BIN_EXE_swarmbench missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
