use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable progress and summary.
    HumanReadable,
    /// Emit JSON result lines (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "tally",
    author,
    version,
    about = "Turn API-test runner events into durable quality reports",
    long_about = "tally consumes the lifecycle event stream of an API-test runner (NDJSON on a file or stdin) and aggregates it into a run summary, a percentile latency profile, an endpoint coverage matrix, a rolling trend history and an HTML dashboard.\n\ntally never executes requests or assertions itself; it only accounts for what the runner already did.",
    after_help = "Examples:\n  tally report run.ndjson\n  runner --emit-events | tally report - --plan api-plan.yaml --reports-dir reports\n  tally report run.ndjson --output json\n  tally coverage run.ndjson --plan api-plan.yaml --out coverage.json"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate an event stream into the full report set
    #[command(
        long_about = "Read runner lifecycle events, fold them into run metrics, and write report.json, dashboard.html, trends.json (and coverage.json when --plan is given) under the reports directory.\n\nThe console summary is always printed, even when persisting an artifact fails."
    )]
    Report(ReportArgs),

    /// Compute endpoint coverage only, against a fixed plan
    Coverage(CoverageArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Path to the NDJSON event stream, or `-` for stdin
    pub events: PathBuf,

    /// Coverage plan (YAML: endpoint pattern -> declared methods).
    /// Without it, no coverage report is produced.
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Directory for persisted artifacts
    #[arg(long, default_value = "reports")]
    pub reports_dir: PathBuf,

    /// How many historical run summaries to retain in trends.json
    #[arg(long, default_value_t = tally_core::trend::DEFAULT_CAPACITY)]
    pub trend_limit: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CoverageArgs {
    /// Path to the NDJSON event stream, or `-` for stdin
    pub events: PathBuf,

    /// Coverage plan (YAML: endpoint pattern -> declared methods)
    #[arg(long)]
    pub plan: PathBuf,

    /// Write the coverage report JSON here as well
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_report_with_defaults() {
        let parsed = Cli::try_parse_from(["tally", "report", "run.ndjson"]);
        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.events, PathBuf::from("run.ndjson"));
                assert_eq!(args.plan, None);
                assert_eq!(args.reports_dir, PathBuf::from("reports"));
                assert_eq!(args.trend_limit, 30);
                assert!(matches!(args.output, OutputFormat::HumanReadable));
            }
            Command::Coverage(_) => panic!("expected report command"),
        }
    }

    #[test]
    fn cli_parses_coverage_with_plan_and_out() {
        let parsed = Cli::try_parse_from([
            "tally",
            "coverage",
            "-",
            "--plan",
            "plan.yaml",
            "--out",
            "coverage.json",
            "--output",
            "json",
        ]);
        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        match cli.command {
            Command::Coverage(args) => {
                assert_eq!(args.events, PathBuf::from("-"));
                assert_eq!(args.plan, PathBuf::from("plan.yaml"));
                assert_eq!(args.out, Some(PathBuf::from("coverage.json")));
                assert!(matches!(args.output, OutputFormat::Json));
            }
            Command::Report(_) => panic!("expected coverage command"),
        }
    }

    #[test]
    fn coverage_requires_a_plan() {
        assert!(Cli::try_parse_from(["tally", "coverage", "run.ndjson"]).is_err());
    }
}
