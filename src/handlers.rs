use anyhow::{Context, Result};

use crate::diagnostics::RequestLog;
use crate::request::Request;
use crate::response::{HttpResponse, StatusCode};

/// Status used when the path does not start with `/<digits>`.
pub const DEFAULT_STATUS: StatusCode = StatusCode::NO_CONTENT;

/// The run of ASCII digits directly after a leading `/`, if there is one.
pub fn leading_digits(path: &str) -> Option<&str> {
    let rest = path.strip_prefix('/')?;
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Status code requested by `path`. The number is not range checked; only
/// a digit run too long for `u64` is an error.
pub fn status_from_path(path: &str) -> Result<StatusCode> {
    match leading_digits(path) {
        Some(digits) => digits
            .parse::<u64>()
            .map(StatusCode)
            .with_context(|| format!("status code {digits} does not fit in 64 bits")),
        None => Ok(DEFAULT_STATUS),
    }
}

/// Logs the request and answers with the status named by its path and an
/// empty body.
pub fn echo_status<L: RequestLog + ?Sized>(req: &Request, log: &L) -> Result<HttpResponse> {
    log.emit(req.url(), &req.headers);

    let status = status_from_path(req.url())?;
    Ok(HttpResponse::new().with_status(status).with_framing_headers())
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;
    use crate::headers::Headers;
    use crate::request::RequestLine;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, Headers)>>);

    impl RequestLog for Recorder {
        fn emit(&self, url: &str, headers: &Headers) {
            self.0.lock().unwrap().push((url.to_string(), headers.clone()));
        }
    }

    fn request(target: &str) -> Request {
        let mut headers = Headers::new();
        headers.append("Host", "localhost:7001");
        Request {
            request_line: RequestLine::parse(&format!("GET {target} HTTP/1.1")).unwrap(),
            headers,
        }
    }

    #[test]
    fn digit_runs() {
        let cases = [
            ("/200", Some("200")),
            ("/503/extra", Some("503")),
            ("/204x", Some("204")),
            ("/0042", Some("0042")),
            ("/x204", None),
            ("/", None),
            ("", None),
            ("200", None),
            ("//200", None),
            ("/foo/bar", None),
        ];
        for (path, expected) in cases {
            assert_eq!(leading_digits(path), expected, "{path:?}");
        }
    }

    #[test]
    fn statuses_from_paths() {
        let cases = [
            ("/200", 200),
            ("/404", 404),
            ("/503/extra", 503),
            ("/0", 0),
            ("/99999", 99999),
            ("/0042", 42),
            ("/", 204),
            ("/abc", 204),
            ("/health", 204),
            ("", 204),
        ];
        for (path, expected) in cases {
            assert_eq!(status_from_path(path).unwrap(), StatusCode(expected), "{path:?}");
        }
        assert!(status_from_path("/123456789012345678901234567890").is_err());
    }

    #[test]
    fn echo_logs_then_answers() {
        let recorder = Recorder::default();
        let response = echo_status(&request("/418?brew=1"), &recorder).unwrap();

        assert_eq!(response.status, StatusCode(418));
        assert!(response.body.is_empty());

        let logged = recorder.0.lock().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, "/418?brew=1");
        assert_eq!(logged[0].1.get("host").map(String::as_str), Some("localhost:7001"));
    }
}
