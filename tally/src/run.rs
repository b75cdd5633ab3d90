use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use tokio::io::AsyncReadExt as _;

use tally_core::{
    CoveragePlan, CoverageTracker, MetricsAccumulator, RunEvent, TrendStore, normalize,
};

use crate::cli::{CoverageArgs, ReportArgs};
use crate::dashboard;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;

pub async fn report(args: ReportArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    let mut tracker = match &args.plan {
        Some(path) => Some(CoverageTracker::new(
            load_plan(path).await.map_err(RunError::InvalidInput)?,
        )),
        None => None,
    };
    let stream = read_events(&args.events)
        .await
        .map_err(RunError::InvalidInput)?;

    let mut acc = MetricsAccumulator::new();

    for (idx, line) in stream.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let raw: tally_core::RawEvent = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(err) => {
                // A single malformed line degrades, it never aborts the run.
                eprintln!("skipping malformed event on line {}: {err}", idx + 1);
                continue;
            }
        };

        if let Some(name) = raw.dispatched_request() {
            out.on_dispatch(name);
            continue;
        }
        let Some(event) = normalize(raw) else {
            continue;
        };

        if let RunEvent::AssertionRecorded(a) = &event {
            out.on_assertion(a);
        }
        if let RunEvent::RequestCompleted(o) = &event
            && let Some(t) = tracker.as_mut()
        {
            t.record(o.method, &o.url);
        }
        acc.observe(&event);
    }

    let metrics = acc
        .snapshot()
        .map_err(|err| RunError::InvalidInput(err.into()))?;
    let percentiles = tally_core::summarize(&metrics.response_times_ms);
    let run_report = tally_core::report::build(&metrics, &percentiles);
    let coverage_report = tracker.as_ref().map(|t| t.report());

    // Console output comes first: a failed write must never suppress the
    // in-memory results.
    out.print_summary(&run_report, &percentiles)
        .map_err(RunError::RuntimeError)?;
    if let Some(cov) = &coverage_report {
        out.print_coverage(cov).map_err(RunError::RuntimeError)?;
    }

    let mut persist_failed = false;
    let dir = &args.reports_dir;
    match tokio::fs::create_dir_all(dir).await {
        Err(err) => {
            eprintln!(
                "persistence failed: cannot create reports dir {}: {err}",
                dir.display()
            );
            persist_failed = true;
        }
        Ok(()) => {
            note(
                write_json(&dir.join("report.json"), &run_report).await,
                &mut persist_failed,
            );
            if let Some(cov) = &coverage_report {
                note(
                    write_json(&dir.join("coverage.json"), cov).await,
                    &mut persist_failed,
                );
            }

            let store = TrendStore::with_capacity(dir.join("trends.json"), args.trend_limit);
            note(
                store
                    .append(run_report.summary.clone())
                    .map(|_| ())
                    .map_err(anyhow::Error::from),
                &mut persist_failed,
            );

            let html = dashboard::render(&run_report, &percentiles);
            let html_path = dir.join("dashboard.html");
            note(
                tokio::fs::write(&html_path, html)
                    .await
                    .with_context(|| format!("failed to write {}", html_path.display())),
                &mut persist_failed,
            );
        }
    }

    Ok(ExitCode::from_run(
        metrics.failed_tests,
        metrics.failed_requests,
        persist_failed,
    ))
}

pub async fn coverage(args: CoverageArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    let plan = load_plan(&args.plan).await.map_err(RunError::InvalidInput)?;
    let stream = read_events(&args.events)
        .await
        .map_err(RunError::InvalidInput)?;

    let mut tracker = CoverageTracker::new(plan);
    for (idx, line) in stream.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw: tally_core::RawEvent = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(err) => {
                eprintln!("skipping malformed event on line {}: {err}", idx + 1);
                continue;
            }
        };
        if let Some(RunEvent::RequestCompleted(o)) = normalize(raw) {
            tracker.record(o.method, &o.url);
        }
    }

    let report = tracker.report();
    out.print_coverage(&report).map_err(RunError::RuntimeError)?;

    if let Some(path) = &args.out {
        write_json(path, &report).await.map_err(RunError::RuntimeError)?;
    }

    Ok(ExitCode::Success)
}

async fn load_plan(path: &Path) -> anyhow::Result<CoveragePlan> {
    let yaml = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read coverage plan: {}", path.display()))?;
    CoveragePlan::from_yaml(&yaml)
        .with_context(|| format!("failed to parse coverage plan: {}", path.display()))
}

async fn read_events(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read events from stdin")?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read events: {}", path.display()))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

fn note(result: anyhow::Result<()>, persist_failed: &mut bool) {
    if let Err(err) = result {
        eprintln!("persistence failed: {err:#}");
        *persist_failed = true;
    }
}
