use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::event::HttpMethod;
use crate::report::rfc3339_millis;

/// Placeholder for numeric path segments in normalized coverage keys.
pub const PATH_PARAM: &str = ":id";

/// Static declaration of the API surface under test: endpoint pattern to the
/// set of methods a complete suite should exercise. Passed into the tracker
/// at construction so plans for different API versions can coexist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveragePlan {
    pub endpoints: BTreeMap<String, BTreeSet<HttpMethod>>,
}

impl CoveragePlan {
    pub fn from_yaml(input: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(input)?)
    }
}

/// Marks declared endpoint+method pairs exercised as request events arrive.
///
/// Lifecycle is independent of any single run's metrics: observations keep
/// accumulating across runs until [`CoverageTracker::reset`].
#[derive(Debug, Clone)]
pub struct CoverageTracker {
    entries: BTreeMap<String, EndpointEntry>,
}

#[derive(Debug, Clone)]
struct EndpointEntry {
    declared: BTreeSet<HttpMethod>,
    observed: BTreeSet<HttpMethod>,
}

impl CoverageTracker {
    pub fn new(plan: CoveragePlan) -> Self {
        let entries = plan
            .endpoints
            .into_iter()
            .map(|(endpoint, declared)| {
                (
                    endpoint,
                    EndpointEntry {
                        declared,
                        observed: BTreeSet::new(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Records one observation. Undeclared endpoints and methods are
    /// silently ignored:
    /// the plan is a fixed contract surface, not a live schema. Repeated
    /// identical observations are idempotent.
    pub fn record(&mut self, method: HttpMethod, raw_url: &str) {
        let key = normalize_path(raw_url);
        if let Some(entry) = self.entries.get_mut(&key)
            && entry.declared.contains(&method)
        {
            entry.observed.insert(method);
        }
    }

    /// Drops all observations, keeping the declaration.
    pub fn reset(&mut self) {
        for entry in self.entries.values_mut() {
            entry.observed.clear();
        }
    }

    pub fn report(&self) -> CoverageReport {
        let mut total_methods = 0usize;
        let mut tested_methods = 0usize;

        let endpoints = self
            .entries
            .iter()
            .map(|(endpoint, entry)| {
                // record() only admits declared methods, so observed is
                // already a subset of declared.
                let declared = entry.declared.len();
                let tested = entry.observed.len();
                total_methods += declared;
                tested_methods += tested;

                EndpointCoverage {
                    endpoint: endpoint.clone(),
                    total_methods: declared,
                    tested_methods: tested,
                    coverage: format_pct(tested, declared),
                    untested: entry.declared.difference(&entry.observed).copied().collect(),
                }
            })
            .collect::<Vec<_>>();

        CoverageReport {
            summary: CoverageSummary {
                total_endpoints: self.entries.len(),
                total_methods,
                tested_methods,
                overall_coverage: format_pct(tested_methods, total_methods),
            },
            endpoints,
            timestamp: rfc3339_millis(chrono::Utc::now()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub summary: CoverageSummary,
    pub endpoints: Vec<EndpointCoverage>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub total_endpoints: usize,
    pub total_methods: usize,
    pub tested_methods: usize,
    pub overall_coverage: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCoverage {
    pub endpoint: String,
    pub total_methods: usize,
    pub tested_methods: usize,
    pub coverage: String,
    pub untested: Vec<HttpMethod>,
}

fn format_pct(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", (part as f64 / whole as f64) * 100.0)
}

/// Reduces a raw request URL to a stable coverage key: the path with every
/// purely-numeric segment collapsed to [`PATH_PARAM`].
pub fn normalize_path(raw_url: &str) -> String {
    let path = path_of(raw_url);
    let normalized = path
        .split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                PATH_PARAM
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{normalized}")
    }
}

fn path_of(raw_url: &str) -> &str {
    let path = match url::Url::parse(raw_url) {
        Ok(_) => {
            // Absolute URL: take everything from the first slash after the
            // authority, without reallocating.
            raw_url
                .find("://")
                .and_then(|i| raw_url[i + 3..].find('/').map(|j| &raw_url[i + 3 + j..]))
                .unwrap_or("/")
        }
        Err(_) => raw_url,
    };
    let path = path.split('?').next().unwrap_or(path);
    path.split('#').next().unwrap_or(path)
}
