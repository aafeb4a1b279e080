//! Per-request diagnostic output.

use log::debug;

use crate::headers::Headers;

/// Sink for the URL and headers of every request.
///
/// Implementations must not fail or block: a request is answered whether
/// or not its diagnostics went anywhere.
pub trait RequestLog: Send + Sync {
    fn emit(&self, url: &str, headers: &Headers);
}

/// Writes to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugLog;

impl RequestLog for DebugLog {
    fn emit(&self, url: &str, headers: &Headers) {
        debug!(target: "echo_status::request", "{url:?}");
        debug!(target: "echo_status::request", "{headers:?}");
    }
}

/// Drops all diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl RequestLog for Discard {
    fn emit(&self, _url: &str, _headers: &Headers) {}
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    use super::*;

    struct Capture(Mutex<Vec<(Level, String, String)>>);

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            self.0.lock().unwrap().push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn debug_log_writes_url_and_headers() {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Debug);

        let mut headers = Headers::new();
        headers.append("Host", "localhost:7001");
        DebugLog.emit("/418?x", &headers);

        let records: Vec<_> = CAPTURE
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, target, _)| target == "echo_status::request")
            .cloned()
            .collect();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|(level, _, _)| *level == Level::Debug));
        assert!(records[0].2.contains("/418?x"));
        assert!(records[1].2.contains("localhost:7001"));
    }

    #[test]
    fn discard_accepts_anything() {
        Discard.emit("", &Headers::new());
    }
}
