use std::fmt::Write as _;

use tally_core::percentile::PercentileSummary;
use tally_core::RunReport;

/// Renders the self-contained HTML dashboard for one run.
///
/// Every request name, URL and failure message is untrusted runner output and
/// is escaped before interpolation; a missing escape here is a correctness
/// bug, not cosmetics.
pub(crate) fn render(report: &RunReport, percentiles: &PercentileSummary) -> String {
    let s = &report.summary;
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str("<title>tally — run report</title>\n");
    out.push_str(STYLE);
    out.push_str("</head>\n<body>\n<div class=\"container\">\n");

    writeln!(
        &mut out,
        "<div class=\"header\"><h1>API Test Report</h1><p>generated {}</p></div>",
        escape_html(&s.timestamp)
    )
    .ok();

    out.push_str("<div class=\"cards\">\n");
    card(&mut out, "Pass rate", &format!("{:.2}%", s.pass_rate), s.failed == 0);
    card(
        &mut out,
        "Tests passed",
        &format!("{}/{}", s.passed, s.total_tests),
        s.failed == 0,
    );
    card(
        &mut out,
        "Requests",
        &format!("{} ({} failed)", s.total_requests, s.failed_requests),
        s.failed_requests == 0,
    );
    card(
        &mut out,
        "Avg response",
        &format!("{:.2}ms", s.average_response_time_ms),
        true,
    );
    out.push_str("</div>\n");

    render_percentiles(&mut out, percentiles);
    render_failures(report, &mut out);
    render_requests(report, &mut out);

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

fn card(out: &mut String, title: &str, value: &str, good: bool) {
    let class = if good { "card good" } else { "card bad" };
    writeln!(
        out,
        "<div class=\"{class}\"><h3>{}</h3><div class=\"value\">{}</div></div>",
        escape_html(title),
        escape_html(value)
    )
    .ok();
}

fn render_percentiles(out: &mut String, p: &PercentileSummary) {
    out.push_str("<div class=\"section\"><h2>Latency</h2>\n");
    if p.count == 0 {
        out.push_str("<p>no samples recorded</p></div>\n");
        return;
    }

    out.push_str("<table><thead><tr><th>min</th><th>p50</th><th>p75</th><th>p90</th><th>p95</th><th>p99</th><th>max</th></tr></thead><tbody><tr>");
    for v in [p.min, p.p50, p.p75, p.p90, p.p95, p.p99, p.max] {
        match v {
            Some(ms) => {
                write!(out, "<td>{ms}ms</td>").ok();
            }
            None => out.push_str("<td>-</td>"),
        }
    }
    out.push_str("</tr></tbody></table></div>\n");
}

fn render_failures(report: &RunReport, out: &mut String) {
    if report.failures.is_empty() {
        return;
    }

    writeln!(
        out,
        "<div class=\"section\"><h2>Failures ({})</h2>",
        report.failures.len()
    )
    .ok();
    for f in &report.failures {
        writeln!(
            out,
            "<div class=\"failure\"><div class=\"failure-test\">{}</div><div class=\"failure-error\">{}</div><div class=\"failure-ref\">request: {}</div></div>",
            escape_html(&f.assertion),
            escape_html(&f.error),
            escape_html(&f.request)
        )
        .ok();
    }
    out.push_str("</div>\n");
}

fn render_requests(report: &RunReport, out: &mut String) {
    out.push_str("<div class=\"section\"><h2>Requests</h2>\n<table><thead><tr><th>Request</th><th>Method</th><th>URL</th><th>Status</th><th>Time</th><th>Size</th></tr></thead><tbody>\n");
    for r in &report.requests {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}ms</td><td>{:.2} KB</td></tr>",
            escape_html(&r.name),
            r.method,
            escape_html(&r.url),
            status_class(r.status),
            r.status,
            r.response_time_ms,
            r.size_bytes as f64 / 1024.0
        )
        .ok();
    }
    out.push_str("</tbody></table></div>\n");
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=399 => "status-ok",
        400..=499 => "status-warn",
        _ => "status-err",
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const STYLE: &str = "<style>\n\
body { font-family: -apple-system, 'Segoe UI', sans-serif; background: #f5f5f5; margin: 0; padding: 20px; }\n\
.container { max-width: 1100px; margin: 0 auto; }\n\
.header { background: #2d3748; color: white; padding: 24px; border-radius: 8px; margin-bottom: 16px; }\n\
.header p { opacity: 0.8; margin: 4px 0 0; }\n\
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 12px; margin-bottom: 16px; }\n\
.card { background: white; padding: 16px; border-radius: 8px; box-shadow: 0 1px 4px rgba(0,0,0,0.1); }\n\
.card h3 { color: #666; font-size: 0.8em; text-transform: uppercase; margin: 0 0 8px; }\n\
.card .value { font-size: 1.6em; font-weight: bold; }\n\
.card.good .value { color: #2f855a; }\n\
.card.bad .value { color: #c53030; }\n\
.section { background: white; padding: 16px; border-radius: 8px; box-shadow: 0 1px 4px rgba(0,0,0,0.1); margin-bottom: 16px; }\n\
table { width: 100%; border-collapse: collapse; }\n\
th { text-align: left; background: #f5f5f5; padding: 8px; color: #666; }\n\
td { padding: 8px; border-top: 1px solid #eee; }\n\
.status-ok { color: #2f855a; font-weight: bold; }\n\
.status-warn { color: #c05621; font-weight: bold; }\n\
.status-err { color: #c53030; font-weight: bold; }\n\
.failure { background: #fff5f5; border-left: 4px solid #c53030; padding: 10px; margin-bottom: 8px; border-radius: 4px; }\n\
.failure-test { font-weight: bold; color: #c53030; }\n\
.failure-ref { color: #999; font-size: 0.9em; }\n\
</style>\n";
