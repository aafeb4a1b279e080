use std::fmt;
use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::headers::Headers;

/// A response status code. Not validated: any integer is
/// written to the status line as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(pub u64);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const REQUEST_HEADER_FIELDS_TOO_LARGE: StatusCode = StatusCode(431);

    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Registered reason phrase, or `""` for anything unregistered.
    pub fn reason(self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            102 => "Processing",
            103 => "Early Hints",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            203 => "Non-Authoritative Information",
            204 => "No Content",
            205 => "Reset Content",
            206 => "Partial Content",
            207 => "Multi-Status",
            208 => "Already Reported",
            226 => "IM Used",
            300 => "Multiple Choices",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            305 => "Use Proxy",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            411 => "Length Required",
            412 => "Precondition Failed",
            413 => "Payload Too Large",
            414 => "URI Too Long",
            415 => "Unsupported Media Type",
            416 => "Range Not Satisfiable",
            417 => "Expectation Failed",
            418 => "I'm a Teapot",
            421 => "Misdirected Request",
            422 => "Unprocessable Entity",
            423 => "Locked",
            424 => "Failed Dependency",
            425 => "Too Early",
            426 => "Upgrade Required",
            428 => "Precondition Required",
            429 => "Too Many Requests",
            431 => "Request Header Fields Too Large",
            451 => "Unavailable For Legal Reasons",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            505 => "HTTP Version Not Supported",
            506 => "Variant Also Negotiates",
            507 => "Insufficient Storage",
            508 => "Loop Detected",
            510 => "Not Extended",
            511 => "Network Authentication Required",
            _ => "",
        }
    }

    /// 1xx, 204 and 304 responses never carry a body, so they get no
    /// `Content-Length` either.
    pub fn allows_body(self) -> bool {
        !matches!(self.0, 100..=199 | 204 | 304)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP/1.1 {} {}", self.0, self.reason())
    }
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponse {
    pub fn new() -> Self {
        HttpResponse {
            status: StatusCode::NO_CONTENT,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Headers needed to delimit an empty body on a connection that is
    /// closed right after the response.
    pub fn with_framing_headers(mut self) -> Self {
        self.headers.append("Connection", "close");
        if self.status.allows_body() {
            self.headers.append("Content-Length", &self.body.len().to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
enum WriterState {
    Initial,
    WritingHeaders,
    WritingBody,
    Finishing,
    Done,
}

#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn from(writer: W) -> Self {
        Self { writer, state: WriterState::Initial }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes the whole response and closes the write side.
    pub async fn write_all(&mut self, response: &HttpResponse) -> io::Result<()> {
        self.write_status(&response.status).await?;
        self.write_headers(&response.headers).await?;
        self.write_body(&response.body).await?;
        self.finish().await
    }

    pub async fn write_status(&mut self, status: &StatusCode) -> io::Result<()> {
        self.expect(WriterState::Initial)?;
        self.writer.write_all(format!("{status}\r\n").as_bytes()).await?;
        self.state = WriterState::WritingHeaders;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> io::Result<()> {
        self.expect(WriterState::WritingHeaders)?;
        self.writer.write_all(format!("{headers}\r\n").as_bytes()).await?;
        self.state = WriterState::WritingBody;
        Ok(())
    }

    pub async fn write_body(&mut self, body: &[u8]) -> io::Result<()> {
        self.expect(WriterState::WritingBody)?;
        self.writer.write_all(body).await?;
        self.state = WriterState::Finishing;
        Ok(())
    }

    pub async fn finish(&mut self) -> io::Result<()> {
        self.expect(WriterState::Finishing)?;
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        self.state = WriterState::Done;
        Ok(())
    }

    fn expect(&self, state: WriterState) -> io::Result<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "response written out of order: expected {state:?}, writer is at {:?}",
                self.state
            )))
        }
    }
}
