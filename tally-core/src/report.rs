use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::accumulator::{FailureRecord, RequestRecord, RunMetrics};
use crate::percentile::PercentileSummary;

/// The structured run report, serialized as `report.json`. A pure projection
/// of frozen metrics plus the percentile summary; writing it anywhere is the
/// caller's job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub summary: RunSummary,
    pub requests: Vec<RequestRecord>,
    pub failures: Vec<FailureRecord>,
    pub performance: Performance,
}

/// One run's headline numbers. Also the unit of trend history: each run
/// appends its summary as a trend point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_tests: u64,
    pub passed: u64,
    pub failed: u64,
    /// Percentage, rounded to two decimals. 0.0 for a run with no tests.
    pub pass_rate: f64,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub total_time_seconds: f64,
    pub average_response_time_ms: f64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub response_times: Vec<u64>,
    pub percentiles: Percentiles,
}

#[derive(Debug, Clone, Serialize)]
pub struct Percentiles {
    pub p50: Option<u64>,
    pub p75: Option<u64>,
    pub p90: Option<u64>,
    pub p95: Option<u64>,
    pub p99: Option<u64>,
}

pub fn build(metrics: &RunMetrics, percentiles: &PercentileSummary) -> RunReport {
    RunReport {
        summary: build_summary(metrics),
        requests: metrics.requests.clone(),
        failures: metrics.failures.clone(),
        performance: Performance {
            response_times: metrics.response_times_ms.clone(),
            percentiles: Percentiles {
                p50: percentiles.p50,
                p75: percentiles.p75,
                p90: percentiles.p90,
                p95: percentiles.p95,
                p99: percentiles.p99,
            },
        },
    }
}

fn build_summary(metrics: &RunMetrics) -> RunSummary {
    RunSummary {
        total_tests: metrics.total_tests,
        passed: metrics.passed_tests,
        failed: metrics.failed_tests,
        pass_rate: round2(metrics.pass_rate()),
        total_requests: metrics.total_requests,
        failed_requests: metrics.failed_requests,
        total_time_seconds: round2(metrics.total_time_seconds()),
        average_response_time_ms: round2(metrics.average_response_time_ms()),
        min_response_time_ms: metrics.min_response_time_ms(),
        max_response_time_ms: metrics.max_response_time_ms(),
        timestamp: rfc3339_millis(metrics.ended_at.unwrap_or_else(Utc::now)),
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn rfc3339_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::MetricsAccumulator;
    use crate::event::{AssertionOutcome, HttpMethod, RequestOutcome, RunEvent};
    use crate::percentile;
    use chrono::TimeZone;

    fn frozen_metrics() -> RunMetrics {
        let mut acc = MetricsAccumulator::new();
        acc.observe(&RunEvent::RunStarted {
            at: Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 0).single().unwrap_or_default(),
        });
        acc.observe(&RunEvent::RequestCompleted(RequestOutcome {
            name: "Get user".to_string(),
            method: HttpMethod::Get,
            url: "/users/1".to_string(),
            status: 200,
            duration_ms: 150,
            size_bytes: 1024,
            failed: false,
        }));
        acc.observe(&RunEvent::AssertionRecorded(AssertionOutcome {
            name: "status is 200".to_string(),
            request_ref: "Get user".to_string(),
            passed: true,
            error: None,
        }));
        acc.observe(&RunEvent::RunEnded {
            at: Utc.with_ymd_and_hms(2026, 8, 29, 10, 0, 1).single().unwrap_or_default(),
        });
        match acc.snapshot() {
            Ok(m) => m,
            Err(err) => panic!("snapshot failed: {err}"),
        }
    }

    #[test]
    fn report_serializes_with_camel_case_contract_keys() {
        let metrics = frozen_metrics();
        let report = build(&metrics, &percentile::summarize(&metrics.response_times_ms));

        let v = match serde_json::to_value(&report) {
            Ok(v) => v,
            Err(err) => panic!("to_value failed: {err}"),
        };

        assert_eq!(v.pointer("/summary/totalTests").and_then(|x| x.as_u64()), Some(1));
        assert_eq!(v.pointer("/summary/passRate").and_then(|x| x.as_f64()), Some(100.0));
        assert_eq!(
            v.pointer("/summary/totalTimeSeconds").and_then(|x| x.as_f64()),
            Some(1.0)
        );
        assert_eq!(
            v.pointer("/summary/timestamp").and_then(|x| x.as_str()),
            Some("2026-08-29T10:00:01.000Z")
        );
        assert_eq!(
            v.pointer("/performance/percentiles/p50").and_then(|x| x.as_u64()),
            Some(150)
        );
        assert_eq!(
            v.pointer("/requests/0/responseTimeMs").and_then(|x| x.as_u64()),
            Some(150)
        );
    }

    #[test]
    fn empty_run_summary_has_sentinel_values() {
        let mut acc = MetricsAccumulator::new();
        acc.observe(&RunEvent::RunStarted { at: Utc::now() });
        acc.observe(&RunEvent::RunEnded { at: Utc::now() });
        let metrics = match acc.snapshot() {
            Ok(m) => m,
            Err(err) => panic!("snapshot failed: {err}"),
        };

        let report = build(&metrics, &percentile::summarize(&metrics.response_times_ms));
        assert_eq!(report.summary.pass_rate, 0.0);
        assert_eq!(report.summary.average_response_time_ms, 0.0);
        assert_eq!(report.performance.percentiles.p50, None);
        assert!(report.requests.is_empty());
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.005), 0.01);
    }
}
