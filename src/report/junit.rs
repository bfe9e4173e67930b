use crate::report::report_model::{TestSuiteReport, failure_lines};

// ============================================================================
// JUnit XML reporter: standard CI integration format
// ============================================================================

/// Generate a JUnit XML report for CI systems (Jenkins, GitHub Actions, GitLab CI).
///
/// Produces standard JUnit XML:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="..." tests="2" failures="1" time="1.234">
///   <testcase name="Login Page › should have a continue button [chromium]" classname="Login Page" />
///   <testcase name="Successful Login › ... [chromium]" classname="Successful Login">
///     <failure message="missing_credential" type="StepFailure">
///       Step 0 (login) [missing_credential]: ...
///     </failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &TestSuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        if result.passed {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\" />\n",
                escape_xml(&result.title),
                escape_xml(&result.group)
            ));
            continue;
        }

        let failed_assertions = result.assertion_results.iter().filter(|ar| !ar.passed).count();
        let (failure_message, failure_type) = match &result.failure {
            Some(f) => (f.kind.as_str().to_string(), "StepFailure"),
            None => (
                format!("{} assertion(s) failed", failed_assertions),
                "AssertionFailure",
            ),
        };

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"{class}\">\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n  </testcase>\n",
            name = escape_xml(&result.title),
            class = escape_xml(&result.group),
            message = escape_xml(&failure_message),
            kind = failure_type,
            body = escape_xml(&failure_lines(result).join("\n")),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
