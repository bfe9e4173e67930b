use crate::flow::state::LoginFlowState;
use crate::scenario::scenario_model::AssertionResult;

/// Tracks the execution state and results of a running scenario.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Current step index (0-based)
    pub current_step: usize,

    /// Flow state the page is predicted to be in
    pub state: LoginFlowState,

    /// All assertion results collected during execution
    pub assertion_results: Vec<AssertionResult>,
}

impl ScenarioContext {
    pub fn new(initial: LoginFlowState) -> Self {
        ScenarioContext {
            current_step: 0,
            state: initial,
            assertion_results: Vec::new(),
        }
    }

    /// Record assertion results from a step.
    pub fn record_assertions(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    /// Check if all recorded assertions passed.
    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }

    pub fn pass_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| r.passed).count()
    }

    pub fn fail_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| !r.passed).count()
    }
}
