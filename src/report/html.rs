use crate::report::report_model::{TestSuiteReport, failure_lines};
use crate::scenario::scenario_model::ScenarioResult;

// ============================================================================
// HTML reporter: self-contained HTML report
// ============================================================================

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; color: #222; }
header { border-top: 6px solid; padding-top: 0.5em; }
header.passed { border-color: #2e7d32; }
header.failed { border-color: #c62828; }
table { border-collapse: collapse; width: 100%; margin-bottom: 1.5em; }
th, td { border-bottom: 1px solid #ddd; padding: 4px 8px; text-align: left; }
tr.fail td { color: #c62828; }
.failures li { font-family: monospace; }";

/// Generate a self-contained HTML report: one table per describe group,
/// then the details of every failed case.
pub fn generate_html_report(report: &TestSuiteReport) -> String {
    let (verdict_class, verdict) = if report.all_passed() {
        ("passed", "ALL TESTS PASSED")
    } else {
        ("failed", "SOME TESTS FAILED")
    };

    let duration = report
        .duration_ms
        .map(|ms| format!(" in {:.1}s", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut body = String::new();
    for (group, results) in by_group(&report.results) {
        body.push_str(&group_table(group, &results));
    }
    if !report.all_passed() {
        body.push_str(&failure_section(report));
    }

    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"UTF-8\">
<title>{suite}: test report</title>
<style>
{style}
</style>
</head>
<body>
<header class=\"{verdict_class}\">
<h1>{verdict}</h1>
<p>{suite}: {passed} passed, {failed} failed ({total} total){duration}</p>
</header>
{body}</body>
</html>
",
        suite = escape_html(&report.suite_name),
        style = STYLE,
        verdict_class = verdict_class,
        verdict = verdict,
        passed = report.passed,
        failed = report.failed,
        total = report.total,
        duration = duration,
        body = body,
    )
}

/// Results grouped by describe group, groups in first-seen order.
fn by_group(results: &[ScenarioResult]) -> Vec<(&str, Vec<&ScenarioResult>)> {
    let mut groups: Vec<(&str, Vec<&ScenarioResult>)> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|(g, _)| *g == result.group) {
            Some((_, members)) => members.push(result),
            None => groups.push((result.group.as_str(), vec![result])),
        }
    }
    groups
}

fn group_table(group: &str, results: &[&ScenarioResult]) -> String {
    let mut out = format!(
        "<section>\n<h2>{}</h2>\n<table>\n<tr><th>Case</th><th>Engine</th><th>Viewport</th><th>Result</th></tr>\n",
        escape_html(group)
    );
    for r in results {
        let (class, label) = if r.passed { ("pass", "PASS") } else { ("fail", "FAIL") };
        out.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            escape_html(&r.scenario_name),
            r.engine,
            escape_html(r.viewport.as_deref().unwrap_or("-")),
            label,
        ));
    }
    out.push_str("</table>\n</section>\n");
    out
}

fn failure_section(report: &TestSuiteReport) -> String {
    let mut out = String::from("<section class=\"failures\">\n<h2>Failures</h2>\n");
    for r in report.failures() {
        let state = r
            .final_state
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "<h3>{}</h3>\n<p>Final state: {} | Steps run: {}</p>\n<ul>\n",
            escape_html(&r.title),
            escape_html(&state),
            r.steps_run,
        ));
        for line in failure_lines(r) {
            out.push_str(&format!("<li>{}</li>\n", escape_html(&line)));
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</section>\n");
    out
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
