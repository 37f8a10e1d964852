use log::debug;
use percent_encoding::percent_decode_str;
use std::io::{self, Read};
use thiserror::Error;

pub const MAX_HEAD_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection closed before a complete request was received")]
    Incomplete,
    #[error("request head exceeds {} bytes", MAX_HEAD_SIZE)]
    TooLarge,
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RequestError {
    /// Whether the client is still there to receive a `400 Bad Request`.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::TooLarge | Self::MalformedRequestLine(_))
    }
}

/// What the loop knows about one request; everything except `path` is only logged.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub sequence: usize,
    pub path: String,
    pub method: String,
    pub host: String,
    pub user_agent: String,
}

pub fn read_request_head<R: Read>(stream: &mut R) -> Result<Vec<u8>, RequestError> {
    let mut head = Vec::with_capacity(1024);
    let mut buffer = [0u8; 1024];

    loop {
        let bytes_read = match stream.read(&mut buffer) {
            Ok(0) => return Err(RequestError::Incomplete),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        head.extend_from_slice(&buffer[..bytes_read]);
        if let Some(end) = head_end(&head) {
            debug!("Request head received ({} bytes)", end);
            head.truncate(end);
            return Ok(head);
        }

        if head.len() > MAX_HEAD_SIZE {
            return Err(RequestError::TooLarge);
        }
    }
}

pub fn parse_request(head: &[u8], sequence: usize) -> Result<RequestContext, RequestError> {
    let head = String::from_utf8_lossy(head);
    let mut lines = head.lines();

    let request_line = lines.next().unwrap_or_default();
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(RequestError::MalformedRequestLine(request_line.to_string()));
    }

    let mut context = RequestContext {
        sequence,
        path: local_path(parts[1]),
        method: parts[0].to_string(),
        host: String::new(),
        user_agent: String::new(),
    };

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("host") {
            context.host = value.to_string();
        } else if name.eq_ignore_ascii_case("user-agent") {
            context.user_agent = value.to_string();
        }
    }

    Ok(context)
}

/// Reduces a request target to its decoded path: scheme, authority, query
/// and fragment are dropped.
pub fn local_path(target: &str) -> String {
    let without_authority = match target.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("/", |start| &rest[start..]),
        None => target,
    };

    let path = without_authority
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

fn head_end(buffer: &[u8]) -> Option<usize> {
    if let Some(i) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some(i + 4);
    }
    buffer.windows(2).position(|w| w == b"\n\n").map(|i| i + 2)
}
