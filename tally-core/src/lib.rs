pub mod accumulator;
pub mod coverage;
pub mod error;
pub mod event;
pub mod ingest;
pub mod percentile;
pub mod report;
pub mod trend;

pub use accumulator::{FailureRecord, MetricsAccumulator, RequestRecord, RunMetrics};
pub use coverage::{CoveragePlan, CoverageReport, CoverageTracker};
pub use error::Error;
pub use event::{AssertionOutcome, HttpMethod, RequestOutcome, RunEvent};
pub use ingest::{RawEvent, normalize};
pub use percentile::{PercentileSummary, summarize};
pub use report::{RunReport, RunSummary, build};
pub use trend::{TrendPoint, TrendStore};
