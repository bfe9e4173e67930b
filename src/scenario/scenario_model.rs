use serde::{Deserialize, Serialize};

use crate::assertion::expectation::Expectation;
use crate::browser::engine::BrowserEngine;
use crate::error::HarnessError;
use crate::fixtures::catalog::FixtureRef;
use crate::flow::state::LoginFlowState;

/// Where a scenario's fresh page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// Application root, `/` under the configured base URL
    AppRoot,
    /// Identity-provider login-identifier endpoint
    LoginIdentifier,
    /// No navigation; the first step navigates itself
    Blank,
}

impl EntryPoint {
    /// Flow state the page is in once the entry point has loaded.
    pub fn initial_state(&self) -> LoginFlowState {
        match self {
            EntryPoint::AppRoot | EntryPoint::Blank => LoginFlowState::Anonymous,
            EntryPoint::LoginIdentifier => LoginFlowState::OnLoginPage,
        }
    }
}

/// One concrete login-journey test: where to start, what to do, what to see.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Human-readable name for this scenario
    pub name: String,

    /// Group the scenario is reported under
    pub group: String,

    pub entry: EntryPoint,

    /// Run once per configured viewport instead of at the default size
    #[serde(default)]
    pub per_viewport: bool,

    /// Ordered list of steps to execute
    pub steps: Vec<ScenarioStep>,
}

/// A single step of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    OpenLoginSubNav,

    NavigateToLoginPage,

    SubmitEmail { email: FixtureRef },

    SubmitPassword { password: FixtureRef },

    /// Press continue without filling the current field
    ClickContinue,

    Login {
        email: FixtureRef,
        password: FixtureRef,
    },

    /// Verify observations against the current page
    Expect { expectations: Vec<Expectation> },
}

impl ScenarioStep {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioStep::OpenLoginSubNav => "open_login_sub_nav",
            ScenarioStep::NavigateToLoginPage => "navigate_to_login_page",
            ScenarioStep::SubmitEmail { .. } => "submit_email",
            ScenarioStep::SubmitPassword { .. } => "submit_password",
            ScenarioStep::ClickContinue => "click_continue",
            ScenarioStep::Login { .. } => "login",
            ScenarioStep::Expect { .. } => "expect",
        }
    }
}

/// Result of evaluating a single expectation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Which step this expectation belongs to (0-indexed)
    pub step_index: usize,

    pub expectation: Expectation,

    pub passed: bool,

    /// Expected value as compared, after engine/fixture resolution
    pub expected: Option<String>,

    /// Last observed value
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// Why a scenario stopped before finishing its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    LocateTimeout,
    NavigationTimeout,
    MissingCredential,
    IllegalTransition,
    Session,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::LocateTimeout => "locate_timeout",
            FailureKind::NavigationTimeout => "navigation_timeout",
            FailureKind::MissingCredential => "missing_credential",
            FailureKind::IllegalTransition => "illegal_transition",
            FailureKind::Session => "session",
        }
    }
}

impl From<&HarnessError> for FailureKind {
    fn from(error: &HarnessError) -> Self {
        match error {
            HarnessError::LocateTimeout { .. } => FailureKind::LocateTimeout,
            HarnessError::NavigationTimeout { .. } => FailureKind::NavigationTimeout,
            HarnessError::MissingCredential { .. } => FailureKind::MissingCredential,
            HarnessError::IllegalTransition { .. } => FailureKind::IllegalTransition,
            _ => FailureKind::Session,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepFailure {
    /// Step that failed; `None` while opening the session or entry page
    pub step_index: Option<usize>,
    pub step: Option<String>,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of running one scenario case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Group, viewport, name and engine, as displayed
    pub title: String,

    pub scenario_name: String,

    pub group: String,

    pub engine: BrowserEngine,

    pub viewport: Option<String>,

    /// Whether all steps ran and every expectation passed
    pub passed: bool,

    /// Number of steps that were executed
    pub steps_run: usize,

    /// Flow state the model predicts the page ended in
    pub final_state: Option<LoginFlowState>,

    pub assertion_results: Vec<AssertionResult>,

    /// Set when a step could not be carried out
    pub failure: Option<StepFailure>,
}
