use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

/// One normalized runner lifecycle event.
///
/// For a single run, exactly one `RunStarted` precedes all other events and
/// exactly one `RunEnded` follows all others. Delivery is strictly ordered;
/// there is no undo path for an observed event.
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted { at: DateTime<Utc> },
    RequestCompleted(RequestOutcome),
    AssertionRecorded(AssertionOutcome),
    RunEnded { at: DateTime<Utc> },
}

#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    pub duration_ms: u64,
    pub size_bytes: u64,
    /// Transport-level failure (no usable response). Distinct from an HTTP
    /// error status; the accumulator treats either as a failed request.
    pub failed: bool,
}

#[derive(Debug, Clone)]
pub struct AssertionOutcome {
    pub name: String,
    pub request_ref: String,
    pub passed: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn http_method_parses_case_insensitively() {
        assert_eq!(HttpMethod::from_str("GET"), Ok(HttpMethod::Get));
        assert_eq!(HttpMethod::from_str("delete"), Ok(HttpMethod::Delete));
        assert!(HttpMethod::from_str("FETCH").is_err());
    }

    #[test]
    fn http_method_displays_uppercase() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }
}
