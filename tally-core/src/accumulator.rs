use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::event::{HttpMethod, RunEvent};

/// Everything observed for one run. Created at `run_start`, mutated only by
/// the owning [`MetricsAccumulator`], frozen once `run_end` arrives.
///
/// Invariants held after every event:
/// `passed_tests + failed_tests == total_tests` and
/// `failed_requests <= total_requests`.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub total_requests: u64,
    pub failed_requests: u64,

    /// Response-time samples in milliseconds, append-only, arrival order.
    pub response_times_ms: Vec<u64>,
    pub requests: Vec<RequestRecord>,
    pub failures: Vec<FailureRecord>,

    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub status: u16,
    pub response_time_ms: u64,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub assertion: String,
    pub request: String,
    pub error: String,
}

impl RunMetrics {
    /// Percentage of passed assertions. An empty run reports 0.0 rather than
    /// a NaN.
    pub fn pass_rate(&self) -> f64 {
        if self.total_tests == 0 {
            return 0.0;
        }
        (self.passed_tests as f64 / self.total_tests as f64) * 100.0
    }

    pub fn total_time_seconds(&self) -> f64 {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => {
                let ms = end.signed_duration_since(start).num_milliseconds();
                (ms.max(0) as f64) / 1000.0
            }
            _ => 0.0,
        }
    }

    pub fn average_response_time_ms(&self) -> f64 {
        if self.response_times_ms.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.response_times_ms.iter().sum();
        sum as f64 / self.response_times_ms.len() as f64
    }

    pub fn min_response_time_ms(&self) -> u64 {
        self.response_times_ms.iter().copied().min().unwrap_or(0)
    }

    pub fn max_response_time_ms(&self) -> u64 {
        self.response_times_ms.iter().copied().max().unwrap_or(0)
    }
}

/// Folds the normalized event stream into [`RunMetrics`], one synchronous
/// update per event. One instance per run.
#[derive(Debug, Default)]
pub struct MetricsAccumulator {
    metrics: RunMetrics,
    ended: bool,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { at } => {
                self.metrics.started_at = Some(*at);
            }
            RunEvent::RequestCompleted(o) => {
                self.metrics.total_requests = self.metrics.total_requests.saturating_add(1);
                if o.failed || o.status >= 400 {
                    self.metrics.failed_requests = self.metrics.failed_requests.saturating_add(1);
                }
                self.metrics.response_times_ms.push(o.duration_ms);
                self.metrics.requests.push(RequestRecord {
                    name: o.name.clone(),
                    method: o.method,
                    url: o.url.clone(),
                    status: o.status,
                    response_time_ms: o.duration_ms,
                    size_bytes: o.size_bytes,
                });
            }
            RunEvent::AssertionRecorded(a) => {
                self.metrics.total_tests = self.metrics.total_tests.saturating_add(1);
                if a.passed {
                    self.metrics.passed_tests = self.metrics.passed_tests.saturating_add(1);
                } else {
                    self.metrics.failed_tests = self.metrics.failed_tests.saturating_add(1);
                    self.metrics.failures.push(FailureRecord {
                        assertion: a.name.clone(),
                        request: a.request_ref.clone(),
                        error: a
                            .error
                            .clone()
                            .unwrap_or_else(|| "assertion failed".to_string()),
                    });
                }
            }
            RunEvent::RunEnded { at } => {
                self.metrics.ended_at = Some(*at);
                self.ended = true;
            }
        }
    }

    /// Immutable copy of the frozen metrics. Only valid once `run_end` has
    /// been observed.
    pub fn snapshot(&self) -> Result<RunMetrics, Error> {
        if !self.ended {
            return Err(Error::IncompleteRun);
        }
        Ok(self.metrics.clone())
    }

    /// Live view for progress rendering during the run.
    pub fn current(&self) -> &RunMetrics {
        &self.metrics
    }
}
