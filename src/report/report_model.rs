use serde::{Deserialize, Serialize};

use crate::scenario::scenario_model::ScenarioResult;

// ============================================================================
// Suite report: aggregates the results of every scenario case
// ============================================================================

/// Aggregated report for a run of scenario cases.
///
/// Built from a `Vec<ScenarioResult>` via `from_results()`. Consumed by
/// console, HTML, and JUnit reporters to produce human-readable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteReport {
    /// Name of the test suite
    pub suite_name: String,

    /// Total number of cases
    pub total: usize,

    /// Number of passing cases
    pub passed: usize,

    /// Number of failing cases
    pub failed: usize,

    /// Total execution duration in milliseconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    /// Individual case results, in matrix order
    pub results: Vec<ScenarioResult>,
}

impl TestSuiteReport {
    /// Build a suite report from a list of test results.
    ///
    /// Automatically computes total, passed, and failed counts.
    pub fn from_results(suite_name: &str, results: Vec<ScenarioResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed,
            duration_ms: None,
            results,
        }
    }

    /// Set the total execution duration.
    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Whether every case passed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Results that failed, in order.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// One line per problem in a case: the step that could not run, then each
/// failed expectation with expected and actual values.
pub fn failure_lines(result: &ScenarioResult) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(ref failure) = result.failure {
        let location = match (failure.step_index, failure.step.as_deref()) {
            (Some(i), Some(step)) => format!("Step {} ({})", i, step),
            (Some(i), None) => format!("Step {}", i),
            _ => "Setup".to_string(),
        };
        lines.push(format!(
            "{} [{}]: {}",
            location,
            failure.kind.as_str(),
            failure.message
        ));
    }

    for ar in result.assertion_results.iter().filter(|ar| !ar.passed) {
        let detail = ar.message.as_deref().unwrap_or("assertion failed");
        lines.push(format!(
            "Step {}: {} - {} (expected: {}, actual: {})",
            ar.step_index,
            ar.expectation.kind_name(),
            detail,
            ar.expected.as_deref().unwrap_or("-"),
            ar.actual.as_deref().unwrap_or("<none>"),
        ));
    }

    lines
}
