//! A test server that answers each HTTP request with the status code
//! spelled at the start of its path (`GET /503` gets a 503), or 204 when
//! the path does not start with digits.

pub mod config;
pub mod diagnostics;
pub mod handlers;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use diagnostics::{DebugLog, Discard, RequestLog};
pub use server::EchoServer;
