use std::collections::HashMap;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::OrchestratorError;

const MAX_REQUEST_BYTES: usize = 1024 * 1024;
const READ_CHUNK_BYTES: usize = 1024;

pub(super) const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
pub(super) const CONTENT_TYPE_JSON: &str = "application/json";

/// A parsed request with its query string split into pairs.
#[derive(Debug)]
pub(super) struct HttpRequest {
    pub(super) method: String,
    pub(super) path: String,
    pub(super) query: HashMap<String, String>,
    pub(super) body: Vec<u8>,
}

/// A request that could not be read; answered before routing.
#[derive(Debug)]
pub(super) struct RequestError {
    pub(super) status: u16,
    pub(super) message: String,
}

impl RequestError {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub(super) async fn read_http_request(
    socket: &mut TcpStream,
) -> Result<HttpRequest, RequestError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK_BYTES);
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    let header_end;

    loop {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestError::new(400, format!("Failed to read request: {}", err)))?;
        if bytes == 0 {
            return Err(RequestError::new(400, "Empty request"));
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::new(400, "Invalid read length"))?;
        buffer.extend_from_slice(read_slice);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(RequestError::new(413, "Request too large"));
        }
        if let Some(pos) = find_header_end(&buffer) {
            header_end = pos;
            break;
        }
    }

    let header_bytes = buffer
        .get(..header_end)
        .ok_or_else(|| RequestError::new(400, "Malformed request headers"))?;
    let header_text = std::str::from_utf8(header_bytes)
        .map_err(|err| RequestError::new(400, format!("Invalid request encoding: {}", err)))?;
    let mut lines = header_text.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing HTTP method"))?;
    let target = parts
        .next()
        .ok_or_else(|| RequestError::new(400, "Missing request path"))?;

    let mut content_length = 0usize;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(RequestError::new(400, "Malformed header"));
        };
        if key.trim().eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse::<usize>()
                .map_err(|err| {
                    RequestError::new(400, format!("Invalid Content-Length: {}", err))
                })?;
        }
    }
    if content_length > MAX_REQUEST_BYTES {
        return Err(RequestError::new(413, "Request body too large"));
    }

    let body_start = header_end
        .checked_add(4)
        .ok_or_else(|| RequestError::new(400, "Malformed request headers"))?;
    let mut body = buffer.get(body_start..).unwrap_or_default().to_vec();
    while body.len() < content_length {
        let bytes = socket
            .read(&mut chunk)
            .await
            .map_err(|err| RequestError::new(400, format!("Failed to read body: {}", err)))?;
        if bytes == 0 {
            break;
        }
        let read_slice = chunk
            .get(..bytes)
            .ok_or_else(|| RequestError::new(400, "Invalid read length"))?;
        body.extend_from_slice(read_slice);
    }
    body.truncate(content_length);

    let (path, query) = split_target(target);
    Ok(HttpRequest {
        method: method.to_owned(),
        path,
        query,
        body,
    })
}

/// Splits `/path?a=1&b=2` into the path and its decoded query pairs.
/// Later duplicates of a key win.
pub(super) fn split_target(target: &str) -> (String, HashMap<String, String>) {
    let (path, raw_query) = target.split_once('?').unwrap_or((target, ""));
    let query = url::form_urlencoded::parse(raw_query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    (path.to_owned(), query)
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

const fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

pub(super) async fn write_response(
    socket: &mut TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
) -> Result<(), OrchestratorError> {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        status_text(status),
        content_type,
        body.len()
    );
    socket
        .write_all(head.as_bytes())
        .await
        .map_err(|err| OrchestratorError::Io {
            context: "write response",
            source: err,
        })?;
    socket
        .write_all(body)
        .await
        .map_err(|err| OrchestratorError::Io {
            context: "write response body",
            source: err,
        })?;
    Ok(())
}
