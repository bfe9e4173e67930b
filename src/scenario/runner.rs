use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::assertion::evaluator::AssertionEvaluator;
use crate::assertion::wait::WaitOptions;
use crate::browser::driver::{PageDriver, SessionFactory};
use crate::error::HarnessError;
use crate::fixtures::catalog::TestDataCatalog;
use crate::flow::actions::{DEFAULT_LOGIN_URL, DEFAULT_NAVIGATION_TIMEOUT_MS, FlowActions};
use crate::flow::state::{FlowAction, InputClass, LoginFlowState};
use crate::scenario::context::ScenarioContext;
use crate::scenario::matrix::ScenarioCase;
use crate::scenario::scenario_model::{
    EntryPoint, ScenarioResult, ScenarioStep, StepFailure,
};
use crate::selectors::registry::SelectorRegistry;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

pub const DEFAULT_BASE_URL: &str = "https://www.hudl.com";
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;

/// Targets and timeouts shared by every case of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub base_url: String,
    pub login_url: String,
    /// Bound on each click/fill locator wait
    pub action_timeout: Duration,
    /// Bound on each page load
    pub navigation_timeout: Duration,
    /// Bound and cadence for expectation retries
    pub wait: WaitOptions,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            login_url: DEFAULT_LOGIN_URL.into(),
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            wait: WaitOptions::default(),
        }
    }
}

impl RunSettings {
    /// Absolute URL of the application root.
    pub fn app_root(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

/// Executes scenario cases, each against its own fresh browser session.
pub struct ScenarioRunner<'a> {
    selectors: &'a SelectorRegistry,
    catalog: &'a TestDataCatalog,
    settings: &'a RunSettings,
    tracer: &'a TraceLogger,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(
        selectors: &'a SelectorRegistry,
        catalog: &'a TestDataCatalog,
        settings: &'a RunSettings,
        tracer: &'a TraceLogger,
    ) -> Self {
        Self {
            selectors,
            catalog,
            settings,
            tracer,
        }
    }

    /// Run cases on up to `workers` threads. Results keep the order of
    /// `cases`; one case failing never affects another.
    pub fn run_cases(
        &self,
        cases: &[ScenarioCase<'_>],
        factory: &dyn SessionFactory,
        workers: usize,
    ) -> Vec<ScenarioResult> {
        let workers = workers.clamp(1, cases.len().max(1));
        if workers == 1 {
            return cases.iter().map(|c| self.run_case(c, factory)).collect();
        }

        let next = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<ScenarioResult>>> = Mutex::new(vec![None; cases.len()]);

        std::thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| {
                    loop {
                        let i = next.fetch_add(1, Ordering::SeqCst);
                        if i >= cases.len() {
                            break;
                        }
                        let result = self.run_case(&cases[i], factory);
                        match slots.lock() {
                            Ok(mut guard) => guard[i] = Some(result),
                            Err(poisoned) => poisoned.into_inner()[i] = Some(result),
                        }
                    }
                });
            }
        });

        slots
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .into_iter()
            .flatten()
            .collect()
    }

    /// Run one case from a fresh session to teardown.
    pub fn run_case(&self, case: &ScenarioCase<'_>, factory: &dyn SessionFactory) -> ScenarioResult {
        let title = case.title();
        info!(scenario = %title, "running");

        let mut ctx = ScenarioContext::new(case.scenario.entry.initial_state());

        let mut page = match factory.open(case.engine, case.viewport.as_ref()) {
            Ok(page) => page,
            Err(e) => {
                warn!(scenario = %title, "could not open browser session: {}", e);
                return self.finish(case, title, None, ctx, 0, Some(setup_failure(&e)));
            }
        };

        if let Err(e) = self.enter(page.as_mut(), case.scenario.entry) {
            warn!(scenario = %title, "could not load entry page: {}", e);
            return self.finish(case, title, None, ctx, 0, Some(setup_failure(&e)));
        }

        let evaluator = AssertionEvaluator::new(
            self.selectors,
            self.catalog,
            case.engine,
            self.settings.wait,
        );

        for (i, step) in case.scenario.steps.iter().enumerate() {
            ctx.current_step = i;
            if let Err(e) = self.execute_step(step, i, page.as_mut(), &evaluator, &mut ctx, &title) {
                warn!(scenario = %title, step = i, action = step.name(), "step failed: {}", e);
                let failure = StepFailure {
                    step_index: Some(i),
                    step: Some(step.name().to_string()),
                    kind: (&e).into(),
                    message: e.to_string(),
                };
                let state = ctx.state;
                return self.finish(case, title, Some(state), ctx, i + 1, Some(failure));
            }
        }

        // Session torn down before the result is reported
        drop(page);

        let state = ctx.state;
        let steps_run = case.scenario.steps.len();
        self.finish(case, title, Some(state), ctx, steps_run, None)
    }

    fn enter(&self, page: &mut dyn PageDriver, entry: EntryPoint) -> Result<(), HarnessError> {
        match entry {
            EntryPoint::AppRoot => {
                page.navigate(&self.settings.app_root(), self.settings.navigation_timeout)
            }
            EntryPoint::LoginIdentifier => {
                page.navigate(&self.settings.login_url, self.settings.navigation_timeout)
            }
            EntryPoint::Blank => Ok(()),
        }
    }

    fn execute_step(
        &self,
        step: &ScenarioStep,
        step_index: usize,
        page: &mut dyn PageDriver,
        evaluator: &AssertionEvaluator<'_>,
        ctx: &mut ScenarioContext,
        title: &str,
    ) -> Result<(), HarnessError> {
        let before = ctx.state;
        let event = TraceEvent::now(title, step_index, step.name(), &before);

        if let ScenarioStep::Expect { expectations } = step {
            let results = evaluator.evaluate_all(page, expectations, step_index);
            let failed = results.iter().filter(|r| !r.passed).count();
            for r in results.iter().filter(|r| !r.passed) {
                warn!(
                    scenario = %title,
                    step = step_index,
                    expected = r.expected.as_deref().unwrap_or_default(),
                    actual = r.actual.as_deref().unwrap_or("<none>"),
                    "{}",
                    r.message.as_deref().unwrap_or("expectation failed")
                );
            }
            self.tracer.log(
                &event
                    .with_state_after(&before)
                    .with_outcome(if failed == 0 { "passed" } else { "failed" })
                    .with_detail(format!(
                        "{}/{} expectations passed",
                        results.len() - failed,
                        results.len()
                    )),
            );
            ctx.record_assertions(results);
            return Ok(());
        }

        if before.is_terminal() {
            warn!(
                scenario = %title,
                step = step_index,
                state = %before,
                "step runs after the flow has ended"
            );
        }

        let actions = FlowActions::new(
            self.selectors,
            &self.settings.login_url,
            self.settings.action_timeout,
        )
        .with_navigation_timeout(self.settings.navigation_timeout);

        match self.drive(step, page, &actions, before) {
            Ok(after) => {
                debug!(scenario = %title, step = step_index, %before, %after, "transition");
                self.tracer.log(&event.with_state_after(&after));
                ctx.state = after;
                Ok(())
            }
            Err(e) => {
                self.tracer
                    .log(&event.with_outcome("error").with_detail(e.to_string()));
                Err(e)
            }
        }
    }

    /// Check the step is legal from `state`, perform it, and return the
    /// settled state it leads to.
    fn drive(
        &self,
        step: &ScenarioStep,
        page: &mut dyn PageDriver,
        actions: &FlowActions<'_>,
        state: LoginFlowState,
    ) -> Result<LoginFlowState, HarnessError> {
        let next = match step {
            ScenarioStep::OpenLoginSubNav => {
                let next = legal(state, FlowAction::OpenLoginSubNav)?;
                actions.open_login_sub_nav(page)?;
                next
            }
            ScenarioStep::NavigateToLoginPage => {
                let next = legal(state, FlowAction::NavigateToLoginPage)?;
                actions.navigate_to_login_page(page)?;
                next
            }
            ScenarioStep::SubmitEmail { email } => {
                let value = self.catalog.resolve(*email)?;
                let next = legal(state, FlowAction::SubmitEmail(InputClass::email(*email, &value)))?;
                actions.submit_email(page, &value)?;
                next
            }
            ScenarioStep::SubmitPassword { password } => {
                let value = self.catalog.resolve(*password)?;
                let class = InputClass::password(*password, &value);
                let next = legal(state, FlowAction::SubmitPassword(class))?;
                actions.submit_password(page, &value)?;
                next
            }
            ScenarioStep::ClickContinue => {
                let next = legal(state, FlowAction::ClickContinue)?;
                actions.click_continue(page)?;
                next
            }
            ScenarioStep::Login { email, password } => {
                let email_value = self.catalog.resolve(*email)?;
                let password_value = self.catalog.resolve(*password)?;
                let action = FlowAction::Login {
                    email: InputClass::email(*email, &email_value),
                    password: InputClass::password(*password, &password_value),
                };
                let next = legal(state, action)?;
                actions.login(page, &email_value, &password_value)?;
                next
            }
            ScenarioStep::Expect { .. } => state,
        };
        Ok(next.settle())
    }

    fn finish(
        &self,
        case: &ScenarioCase<'_>,
        title: String,
        final_state: Option<LoginFlowState>,
        ctx: ScenarioContext,
        steps_run: usize,
        failure: Option<StepFailure>,
    ) -> ScenarioResult {
        let passed = failure.is_none() && ctx.all_passed();
        if passed {
            info!(scenario = %title, assertions = ctx.pass_count(), "passed");
        } else {
            warn!(scenario = %title, failed_assertions = ctx.fail_count(), "failed");
        }
        ScenarioResult {
            title,
            scenario_name: case.scenario.name.clone(),
            group: case.scenario.group.clone(),
            engine: case.engine,
            viewport: case.viewport.as_ref().map(|v| v.name.clone()),
            passed,
            steps_run,
            final_state,
            assertion_results: ctx.assertion_results,
            failure,
        }
    }
}

fn legal(state: LoginFlowState, action: FlowAction) -> Result<LoginFlowState, HarnessError> {
    state
        .transition(action)
        .ok_or_else(|| HarnessError::IllegalTransition {
            from: state.to_string(),
            action: action.name().to_string(),
        })
}

fn setup_failure(error: &HarnessError) -> StepFailure {
    StepFailure {
        step_index: None,
        step: None,
        kind: error.into(),
        message: error.to_string(),
    }
}
