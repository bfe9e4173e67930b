use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::flow::state::LoginFlowState;

/// One executed scenario step, as written to the JSONL trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub scenario: String,
    pub step: usize,
    pub action: String,

    pub state_before: String,
    pub state_after: Option<String>,

    pub outcome: String,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(scenario: &str, step: usize, action: &str, state: &LoginFlowState) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            scenario: scenario.to_string(),
            step,
            action: action.to_string(),
            state_before: state.to_string(),
            state_after: None,
            outcome: "ok".into(),
            detail: None,
        }
    }

    pub fn with_state_after(mut self, state: &LoginFlowState) -> Self {
        self.state_after = Some(state.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = outcome.to_string();
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
