use crate::report::report_model::{TestSuiteReport, failure_lines};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a suite report for terminal output.
///
/// Produces output like:
/// ```text
/// === Test Suite: Hudl login ===
///
/// ✓ PASS  Login Page › should have a continue button [chromium] (1 steps, 1 assertions)
/// ✗ FAIL  Login Page › should show error for invalid email format [webkit] (2 steps, 5 assertions)
///     [FAIL] Step 1: CssEquals - ... (expected: rgb(232, 28, 0), actual: rgb(0, 0, 0))
///
/// === Results: 1 passed, 1 failed (2 total) ===
/// ```
pub fn format_console_report(report: &TestSuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Suite: {} ===\n\n", report.suite_name));

    for result in &report.results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };

        out.push_str(&format!(
            "{}  {} ({} steps, {} assertions)\n",
            marker,
            result.title,
            result.steps_run,
            result.assertion_results.len()
        ));

        if !result.passed {
            if result.failure.is_some() {
                let lines = failure_lines(result);
                if let Some(first) = lines.first() {
                    out.push_str(&format!("    [ERROR] {}\n", first));
                }
                for line in lines.iter().skip(1) {
                    out.push_str(&format!("    [FAIL] {}\n", line));
                }
            } else {
                for line in failure_lines(result) {
                    out.push_str(&format!("    [FAIL] {}\n", line));
                }
            }
        }
    }

    // Summary line
    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}
