use std::fmt::Write as _;

use tally_core::event::AssertionOutcome;
use tally_core::percentile::PercentileSummary;
use tally_core::{CoverageReport, RunReport};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn on_dispatch(&self, name: &str) {
        println!("executing: {name}");
    }

    fn on_assertion(&self, assertion: &AssertionOutcome) {
        if assertion.passed {
            println!("  ok {}", assertion.name);
        } else {
            let message = assertion.error.as_deref().unwrap_or("assertion failed");
            println!("  fail {}: {message}", assertion.name);
        }
    }

    fn print_summary(
        &self,
        report: &RunReport,
        percentiles: &PercentileSummary,
    ) -> anyhow::Result<()> {
        print!("{}", render_summary(report, percentiles));
        Ok(())
    }

    fn print_coverage(&self, report: &CoverageReport) -> anyhow::Result<()> {
        print!("{}", render_coverage(report));
        Ok(())
    }
}

pub(crate) fn render_summary(report: &RunReport, percentiles: &PercentileSummary) -> String {
    let s = &report.summary;
    let mut out = String::new();

    out.push_str("\nsummary\n");
    writeln!(
        &mut out,
        "  tests: {} (passed {}, failed {})",
        s.total_tests, s.passed, s.failed
    )
    .ok();
    writeln!(&mut out, "  pass_rate: {:.2}%", s.pass_rate).ok();
    writeln!(
        &mut out,
        "  requests: {} (failed {})",
        s.total_requests, s.failed_requests
    )
    .ok();
    writeln!(&mut out, "  total_time: {:.2}s", s.total_time_seconds).ok();

    if percentiles.count > 0 {
        writeln!(
            &mut out,
            "  latency = min={} p50={} p75={} p90={} p95={} p99={} max={} mean={:.2}ms (n={})",
            fmt_ms(percentiles.min),
            fmt_ms(percentiles.p50),
            fmt_ms(percentiles.p75),
            fmt_ms(percentiles.p90),
            fmt_ms(percentiles.p95),
            fmt_ms(percentiles.p99),
            fmt_ms(percentiles.max),
            percentiles.mean.unwrap_or(0.0),
            percentiles.count
        )
        .ok();
    } else {
        out.push_str("  latency: n/a\n");
    }

    if !report.failures.is_empty() {
        out.push_str("\nfailures\n");
        for f in &report.failures {
            writeln!(&mut out, "  {} [{}]: {}", f.assertion, f.request, f.error).ok();
        }
    }

    out
}

pub(crate) fn render_coverage(report: &CoverageReport) -> String {
    let s = &report.summary;
    let mut out = String::new();

    out.push_str("\ncoverage\n");
    writeln!(
        &mut out,
        "  overall: {} ({}/{} methods, {} endpoints)",
        s.overall_coverage, s.tested_methods, s.total_methods, s.total_endpoints
    )
    .ok();

    for ep in &report.endpoints {
        if ep.untested.is_empty() {
            writeln!(&mut out, "  {}: {}", ep.endpoint, ep.coverage).ok();
        } else {
            let untested = ep
                .untested
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                &mut out,
                "  {}: {} (untested: {untested})",
                ep.endpoint, ep.coverage
            )
            .ok();
        }
    }

    out
}

fn fmt_ms(v: Option<u64>) -> String {
    match v {
        Some(ms) => format!("{ms}ms"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::percentile::summarize;
    use tally_core::{FailureRecord, MetricsAccumulator, RunEvent, report};

    fn sample_report(failed: bool) -> (RunReport, PercentileSummary) {
        let mut acc = MetricsAccumulator::new();
        acc.observe(&RunEvent::RunStarted {
            at: chrono_now(),
        });
        acc.observe(&RunEvent::RunEnded { at: chrono_now() });
        let mut metrics = match acc.snapshot() {
            Ok(m) => m,
            Err(err) => panic!("snapshot failed: {err}"),
        };
        metrics.total_tests = 3;
        metrics.passed_tests = 2;
        metrics.failed_tests = 1;
        metrics.total_requests = 3;
        metrics.failed_requests = 1;
        metrics.response_times_ms = vec![90, 150, 120];
        if failed {
            metrics.failures.push(FailureRecord {
                assertion: "status is 200".to_string(),
                request: "Get user".to_string(),
                error: "expected 200 but got 404".to_string(),
            });
        }
        let percentiles = summarize(&metrics.response_times_ms);
        (report::build(&metrics, &percentiles), percentiles)
    }

    fn chrono_now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }

    #[test]
    fn summary_includes_counts_and_latency() {
        let (report, percentiles) = sample_report(true);
        let text = render_summary(&report, &percentiles);
        assert!(text.contains("tests: 3 (passed 2, failed 1)"));
        assert!(text.contains("pass_rate: 66.67%"));
        assert!(text.contains("requests: 3 (failed 1)"));
        assert!(text.contains("min=90ms"));
        assert!(text.contains("max=150ms"));
        assert!(text.contains("(n=3)"));
        assert!(text.contains("status is 200 [Get user]: expected 200 but got 404"));
    }

    #[test]
    fn empty_latency_renders_not_available() {
        let (mut report, _) = sample_report(false);
        report.performance.response_times.clear();
        let text = render_summary(&report, &PercentileSummary::default());
        assert!(text.contains("latency: n/a"));
        assert!(!text.contains("failures"));
    }
}
