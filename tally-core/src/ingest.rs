use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::event::{AssertionOutcome, HttpMethod, RequestOutcome, RunEvent};

pub const UNNAMED_REQUEST: &str = "Unnamed Request";

/// One line of the runner's NDJSON lifecycle stream, as emitted.
///
/// Every response-side field is optional: a request that dies on the wire has
/// no response object at all. Normalization fills sentinels instead of
/// erroring so that downstream aggregation stays well-defined.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawEvent {
    RunStart {
        #[serde(default)]
        at: Option<String>,
    },
    BeforeRequest {
        #[serde(default)]
        name: Option<String>,
    },
    Request {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        status: Option<u16>,
        #[serde(default)]
        duration_ms: Option<u64>,
        #[serde(default)]
        size_bytes: Option<u64>,
        #[serde(default)]
        error: Option<String>,
    },
    Assertion {
        name: String,
        #[serde(default)]
        request: Option<String>,
        passed: bool,
        #[serde(default)]
        error: Option<String>,
    },
    RunEnd {
        #[serde(default)]
        at: Option<String>,
    },
}

impl RawEvent {
    /// The request name announced by a `before_request` notification, if this
    /// is one. Dispatch notifications carry no aggregate state and exist only
    /// for console progress.
    pub fn dispatched_request(&self) -> Option<&str> {
        match self {
            RawEvent::BeforeRequest { name } => Some(name.as_deref().unwrap_or(UNNAMED_REQUEST)),
            _ => None,
        }
    }
}

/// Translates a raw runner notification into the normalized event stream.
///
/// Returns `None` only for `before_request`; every other notification maps to
/// exactly one `RunEvent`, in order, with malformed fields degraded to
/// sentinels (`status = 0`, `duration_ms = 0`, `failed = true`) rather than
/// surfaced as errors.
pub fn normalize(raw: RawEvent) -> Option<RunEvent> {
    match raw {
        RawEvent::RunStart { at } => Some(RunEvent::RunStarted { at: parse_at(at) }),
        RawEvent::BeforeRequest { .. } => None,
        RawEvent::Request {
            name,
            method,
            url,
            status,
            duration_ms,
            size_bytes,
            error,
        } => {
            let failed = error.is_some() || status.is_none();
            Some(RunEvent::RequestCompleted(RequestOutcome {
                name: name.unwrap_or_else(|| UNNAMED_REQUEST.to_string()),
                method: method
                    .as_deref()
                    .and_then(|m| HttpMethod::from_str(m).ok())
                    .unwrap_or(HttpMethod::Get),
                url: url.unwrap_or_default(),
                status: status.unwrap_or(0),
                duration_ms: duration_ms.unwrap_or(0),
                size_bytes: size_bytes.unwrap_or(0),
                failed,
            }))
        }
        RawEvent::Assertion {
            name,
            request,
            passed,
            error,
        } => Some(RunEvent::AssertionRecorded(AssertionOutcome {
            name,
            request_ref: request.unwrap_or_default(),
            passed,
            error,
        })),
        RawEvent::RunEnd { at } => Some(RunEvent::RunEnded { at: parse_at(at) }),
    }
}

fn parse_at(at: Option<String>) -> DateTime<Utc> {
    at.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> RawEvent {
        match serde_json::from_str(line) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse raw event: {err}"),
        }
    }

    #[test]
    fn request_line_normalizes_to_completed_outcome() {
        let raw = parse(
            r#"{"type":"request","name":"Get user","method":"GET","url":"https://api.example.com/users/1","status":200,"duration_ms":150,"size_bytes":1024}"#,
        );
        let Some(RunEvent::RequestCompleted(o)) = normalize(raw) else {
            panic!("expected request_completed");
        };
        assert_eq!(o.name, "Get user");
        assert_eq!(o.method, HttpMethod::Get);
        assert_eq!(o.status, 200);
        assert_eq!(o.duration_ms, 150);
        assert!(!o.failed);
    }

    #[test]
    fn request_without_response_degrades_to_sentinels() {
        let raw = parse(r#"{"type":"request","name":"Get user","method":"GET","url":"/users/1"}"#);
        let Some(RunEvent::RequestCompleted(o)) = normalize(raw) else {
            panic!("expected request_completed");
        };
        assert_eq!(o.status, 0);
        assert_eq!(o.duration_ms, 0);
        assert_eq!(o.size_bytes, 0);
        assert!(o.failed);
    }

    #[test]
    fn request_with_transport_error_is_failed_even_with_status() {
        let raw = parse(
            r#"{"type":"request","name":"x","method":"GET","url":"/u","status":200,"duration_ms":10,"error":"connection reset"}"#,
        );
        let Some(RunEvent::RequestCompleted(o)) = normalize(raw) else {
            panic!("expected request_completed");
        };
        assert!(o.failed);
    }

    #[test]
    fn unknown_method_and_missing_name_get_defaults() {
        let raw = parse(r#"{"type":"request","method":"FETCH","url":"/u","status":200}"#);
        let Some(RunEvent::RequestCompleted(o)) = normalize(raw) else {
            panic!("expected request_completed");
        };
        assert_eq!(o.name, UNNAMED_REQUEST);
        assert_eq!(o.method, HttpMethod::Get);
    }

    #[test]
    fn before_request_is_progress_only() {
        let raw = parse(r#"{"type":"before_request","name":"Get user"}"#);
        assert_eq!(raw.dispatched_request(), Some("Get user"));
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn run_start_with_bad_timestamp_still_yields_event() {
        let raw = parse(r#"{"type":"run_start","at":"not a timestamp"}"#);
        assert!(matches!(normalize(raw), Some(RunEvent::RunStarted { .. })));
    }

    #[test]
    fn assertion_line_carries_failure_message() {
        let raw = parse(
            r#"{"type":"assertion","name":"status is 200","request":"Get user","passed":false,"error":"expected 200 but got 404"}"#,
        );
        let Some(RunEvent::AssertionRecorded(a)) = normalize(raw) else {
            panic!("expected assertion_recorded");
        };
        assert_eq!(a.name, "status is 200");
        assert_eq!(a.request_ref, "Get user");
        assert!(!a.passed);
        assert_eq!(a.error.as_deref(), Some("expected 200 but got 404"));
    }
}
