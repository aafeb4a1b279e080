use core::fmt;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::headers::{is_token, Headers};
use crate::response::StatusCode;

/// Upper bound on request line plus header block.
pub const MAX_HEAD_SIZE: usize = 16 * 1024;

#[derive(Error, Debug)]
pub enum HeadError {
    #[error("connection closed before the request head was complete")]
    Closed,

    #[error("request head exceeds {} bytes", MAX_HEAD_SIZE)]
    TooLarge,

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl HeadError {
    /// Status to answer with before closing, if the peer is still there to read it.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HeadError::TooLarge => Some(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE),
            HeadError::Malformed(_) => Some(StatusCode::BAD_REQUEST),
            HeadError::Closed | HeadError::Io(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Initialized,
    ParsingHeaders,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
    Extension(String),
}

impl TryFrom<&str> for Method {
    type Error = HeadError;
    fn try_from(value: &str) -> Result<Self, HeadError> {
        Ok(match value {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            other if is_token(other) => Method::Extension(other.to_string()),
            other => return Err(HeadError::Malformed(format!("invalid method: {other}"))),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Head => write!(f, "HEAD"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Options => write!(f, "OPTIONS"),
            Method::Patch => write!(f, "PATCH"),
            Method::Extension(m) => write!(f, "{m}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl TryFrom<&str> for Version {
    type Error = HeadError;
    fn try_from(value: &str) -> Result<Self, HeadError> {
        match value {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            _ => Err(HeadError::Malformed(format!("unsupported HTTP version: {value}"))),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::Http10 => write!(f, "HTTP/1.0"),
            Version::Http11 => write!(f, "HTTP/1.1"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// Request target exactly as sent.
    pub target: String,
    pub version: Version,
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.version)
    }
}

impl RequestLine {
    pub fn parse(line: &str) -> Result<Self, HeadError> {
        let mut parts = line.split_whitespace();
        let (Some(method_raw), Some(target_raw), Some(version_raw), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(HeadError::Malformed(format!("invalid request line: {line:?}")));
        };

        Ok(Self {
            method: Method::try_from(method_raw)?,
            target: target_raw.to_string(),
            version: Version::try_from(version_raw)?,
        })
    }
}

/// Request head. The body, if any, is left unread on the connection.
#[derive(Debug, Clone)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
}

impl Request {
    pub fn url(&self) -> &str {
        &self.request_line.target
    }

    pub async fn read_head<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Self, HeadError> {
        let mut budget = MAX_HEAD_SIZE;
        let mut state = ParserState::Initialized;
        let mut request_line = None;
        let mut headers = Headers::new();

        loop {
            match state {
                ParserState::Initialized => {
                    let line = read_line(reader, &mut budget).await?;
                    // empty lines ahead of the request line are ignored
                    if line.is_empty() {
                        continue;
                    }
                    request_line = Some(RequestLine::parse(&line)?);
                    state = ParserState::ParsingHeaders;
                }
                ParserState::ParsingHeaders => {
                    let line = read_line(reader, &mut budget).await?;
                    match Headers::parse_line(&line)? {
                        Some((k, v)) => headers.append(&k, &v),
                        None => state = ParserState::Done,
                    }
                }
                ParserState::Done => break,
            }
        }

        let request_line = request_line.ok_or(HeadError::Closed)?;
        Ok(Self { request_line, headers })
    }
}

/// Reads one line, charging it against the remaining head budget.
/// Accepts CRLF or a bare LF.
async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    budget: &mut usize,
) -> Result<String, HeadError> {
    let mut line_bytes = Vec::new();
    let limit = u64::try_from(*budget).unwrap_or(u64::MAX);
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut line_bytes).await?;
    *budget -= n;

    if !line_bytes.ends_with(b"\n") {
        return Err(if *budget == 0 { HeadError::TooLarge } else { HeadError::Closed });
    }
    line_bytes.pop();
    if line_bytes.ends_with(b"\r") {
        line_bytes.pop();
    }
    Ok(String::from_utf8_lossy(&line_bytes).into_owned())
}
