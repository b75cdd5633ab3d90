use crate::cli::OutputFormat;
use tally_core::event::AssertionOutcome;
use tally_core::percentile::PercentileSummary;
use tally_core::{CoverageReport, RunReport};

mod human;
mod json;

pub(crate) trait OutputFormatter {
    /// A request is about to be dispatched by the runner.
    fn on_dispatch(&self, name: &str);
    /// An assertion result arrived.
    fn on_assertion(&self, assertion: &AssertionOutcome);
    fn print_summary(
        &self,
        report: &RunReport,
        percentiles: &PercentileSummary,
    ) -> anyhow::Result<()>;
    fn print_coverage(&self, report: &CoverageReport) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
