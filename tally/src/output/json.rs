use std::io::Write as _;

use serde::Serialize;
use tally_core::event::AssertionOutcome;
use tally_core::percentile::PercentileSummary;
use tally_core::{CoverageReport, RunReport};

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn on_dispatch(&self, _name: &str) {}

    fn on_assertion(&self, _assertion: &AssertionOutcome) {}

    fn print_summary(
        &self,
        report: &RunReport,
        _percentiles: &PercentileSummary,
    ) -> anyhow::Result<()> {
        emit_json_line(&JsonReportLine {
            kind: "report",
            report,
        });
        Ok(())
    }

    fn print_coverage(&self, report: &CoverageReport) -> anyhow::Result<()> {
        emit_json_line(&JsonCoverageLine {
            kind: "coverage",
            report,
        });
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonReportLine<'a> {
    kind: &'static str,
    #[serde(flatten)]
    report: &'a RunReport,
}

#[derive(Debug, Serialize)]
struct JsonCoverageLine<'a> {
    kind: &'static str,
    #[serde(flatten)]
    report: &'a CoverageReport,
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}
