mod common;

use std::time::Duration;

use hudl_login_e2e::assertion::expectation::{ERROR_COLOR, Expectation};
use hudl_login_e2e::assertion::wait::WaitOptions;
use hudl_login_e2e::browser::engine::BrowserEngine;
use hudl_login_e2e::fixtures::catalog::{FixtureRef, TestDataCatalog};
use hudl_login_e2e::flow::state::{AuthErrorReason, EmailStatus, Field, LoginFlowState};
use hudl_login_e2e::scenario::matrix::{NAVIGATION_GROUP, ScenarioCase, ScenarioMatrix};
use hudl_login_e2e::scenario::runner::{RunSettings, ScenarioRunner};
use hudl_login_e2e::scenario::scenario_model::{
    EntryPoint, FailureKind, Scenario, ScenarioResult, ScenarioStep,
};
use hudl_login_e2e::selectors::registry::{SelectorName, SelectorRegistry};
use hudl_login_e2e::trace::logger::TraceLogger;

use crate::common::fake_site::{FakeFactory, SiteBehavior};
use crate::common::{catalog, catalog_without_credentials, fast_settings};

fn run_all(
    behavior: SiteBehavior,
    catalog: &TestDataCatalog,
    engines: &[BrowserEngine],
    workers: usize,
) -> Vec<ScenarioResult> {
    let matrix = ScenarioMatrix::hudl_login();
    let cases = matrix.cases(engines);
    let selectors = SelectorRegistry::default();
    let settings = fast_settings();
    let tracer = TraceLogger::disabled();
    let factory = FakeFactory::new(behavior);
    let runner = ScenarioRunner::new(&selectors, catalog, &settings, &tracer);
    runner.run_cases(&cases, &factory, workers)
}

fn run_one(scenario: &Scenario, behavior: SiteBehavior, catalog: &TestDataCatalog) -> ScenarioResult {
    let case = ScenarioCase {
        scenario,
        viewport: None,
        engine: BrowserEngine::Chromium,
    };
    let selectors = SelectorRegistry::default();
    let settings = fast_settings();
    let tracer = TraceLogger::disabled();
    let factory = FakeFactory::new(behavior);
    ScenarioRunner::new(&selectors, catalog, &settings, &tracer).run_case(&case, &factory)
}

fn find<'a>(results: &'a [ScenarioResult], needle: &str) -> &'a ScenarioResult {
    results
        .iter()
        .find(|r| r.title.contains(needle))
        .unwrap_or_else(|| panic!("no result titled like '{}'", needle))
}

// =========================================================================
// Faithful product
// =========================================================================

#[test]
fn full_matrix_passes_against_faithful_product() {
    let catalog = catalog();
    let results = run_all(
        SiteBehavior::default(),
        &catalog,
        &[BrowserEngine::Chromium, BrowserEngine::Webkit],
        1,
    );
    assert_eq!(results.len(), 30);

    let matrix = ScenarioMatrix::hudl_login();
    for r in &results {
        assert!(r.passed, "{} failed: {:?} {:?}", r.title, r.failure, r.assertion_results);
        let scenario = matrix
            .scenarios
            .iter()
            .find(|s| s.name == r.scenario_name)
            .unwrap();
        assert_eq!(r.steps_run, scenario.steps.len());
    }
}

#[test]
fn final_states_follow_the_flow_model() {
    let catalog = catalog();
    let results = run_all(SiteBehavior::default(), &catalog, &[BrowserEngine::Chromium], 1);

    let state = |needle: &str| find(&results, needle).final_state;
    assert_eq!(
        state("should show error for invalid email format"),
        Some(LoginFlowState::ValidationError(Field::Email))
    );
    assert_eq!(
        state("after submitting valid email"),
        Some(LoginFlowState::PasswordPromptShown(EmailStatus::Unregistered))
    );
    assert_eq!(
        state("(registered email)"),
        Some(LoginFlowState::AuthError(AuthErrorReason::IncorrectCredentials))
    );
    assert_eq!(
        state("(unregistered email)"),
        Some(LoginFlowState::AuthError(AuthErrorReason::UnknownUser))
    );
    assert_eq!(
        state("(no password)"),
        Some(LoginFlowState::ValidationError(Field::Password))
    );
    assert_eq!(
        state("dashboard with valid credentials"),
        Some(LoginFlowState::Authenticated)
    );
}

#[test]
fn each_case_gets_its_own_session() {
    let matrix = ScenarioMatrix::hudl_login();
    let cases = matrix.cases(&[BrowserEngine::Webkit]);
    let selectors = SelectorRegistry::default();
    let settings = fast_settings();
    let tracer = TraceLogger::disabled();
    let catalog = catalog();
    let factory = FakeFactory::default();
    let runner = ScenarioRunner::new(&selectors, &catalog, &settings, &tracer);

    runner.run_cases(&cases, &factory, 1);

    let opened = factory.opened.lock().unwrap().clone();
    assert_eq!(opened.len(), 15);
    assert!(opened.iter().all(|(engine, _)| *engine == BrowserEngine::Webkit));
    assert_eq!(opened[0].1.as_deref(), Some("Desktop"));
    assert_eq!(opened[1].1.as_deref(), Some("Mobile"));
    assert_eq!(opened[6].1, None);
}

#[test]
fn rerunning_a_scenario_gives_the_same_result() {
    let matrix = ScenarioMatrix::hudl_login();
    let scenario = matrix
        .scenarios
        .iter()
        .find(|s| s.name.contains("(registered email)"))
        .unwrap();
    let catalog = catalog();

    let first = run_one(scenario, SiteBehavior::default(), &catalog);
    let second = run_one(scenario, SiteBehavior::default(), &catalog);
    assert!(first.passed && second.passed);
    assert_eq!(first.final_state, second.final_state);
    assert_eq!(first.assertion_results, second.assertion_results);
}

// =========================================================================
// Regressions are detected
// =========================================================================

#[test]
fn wrong_error_color_fails_inline_error_cases() {
    let catalog = catalog();
    let behavior = SiteBehavior {
        error_color: "rgb(200, 0, 0)".into(),
        ..SiteBehavior::default()
    };
    let results = run_all(behavior, &catalog, &[BrowserEngine::Chromium], 1);

    let failed: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    assert_eq!(failed.len(), 3, "{:#?}", failed.iter().map(|r| &r.title).collect::<Vec<_>>());

    let r = find(&results, "invalid email format");
    assert!(r.failure.is_none());
    let bad: Vec<_> = r.assertion_results.iter().filter(|a| !a.passed).collect();
    assert_eq!(bad.len(), 2);
    for a in bad {
        assert!(matches!(a.expectation, Expectation::CssEquals { .. }));
        assert_eq!(a.expected.as_deref(), Some(ERROR_COLOR));
        assert_eq!(a.actual.as_deref(), Some("rgb(200, 0, 0)"));
    }
}

#[test]
fn swapped_auth_messages_are_caught() {
    let catalog = catalog();
    let behavior = SiteBehavior {
        swap_auth_messages: true,
        ..SiteBehavior::default()
    };
    let results = run_all(behavior, &catalog, &[BrowserEngine::Webkit], 1);

    let registered = find(&results, "(registered email)");
    assert!(!registered.passed);
    let text = registered
        .assertion_results
        .iter()
        .find(|a| !a.passed)
        .unwrap();
    assert!(matches!(text.expectation, Expectation::ContainsText { .. }));
    assert_eq!(
        text.expected.as_deref(),
        Some(AuthErrorReason::IncorrectCredentials.message())
    );
    assert_eq!(
        text.actual.as_deref(),
        Some(AuthErrorReason::UnknownUser.message())
    );

    assert!(!find(&results, "(unregistered email)").passed);
    assert!(find(&results, "(no password)").passed);
}

#[test]
fn mobile_only_regression_fails_only_mobile_navigation_cases() {
    let catalog = catalog();
    let behavior = SiteBehavior {
        hide_sub_nav_below_width: Some(768),
        ..SiteBehavior::default()
    };
    let results = run_all(behavior, &catalog, &[BrowserEngine::Chromium], 1);

    for r in &results {
        let mobile_nav =
            r.group == NAVIGATION_GROUP && r.viewport.as_deref() == Some("Mobile");
        assert_eq!(r.passed, !mobile_nav, "{}", r.title);
    }

    // Following the link needs the sub nav, so that case cannot finish its steps
    let r = find(&results, "Mobile \u{203a} should navigate to the login page");
    let failure = r.failure.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::LocateTimeout);
    assert_eq!(failure.step_index, Some(0));
    assert_eq!(failure.step.as_deref(), Some("navigate_to_login_page"));
    assert!(r.assertion_results.is_empty());
}

#[test]
fn heading_change_reports_expected_and_actual() {
    let catalog = catalog();
    let behavior = SiteBehavior {
        heading: "Sign In".into(),
        ..SiteBehavior::default()
    };
    let results = run_all(behavior, &catalog, &[BrowserEngine::Chromium], 1);
    let r = find(&results, "Desktop \u{203a} should navigate to the login page");
    let heading = r.assertion_results.iter().find(|a| !a.passed).unwrap();
    assert_eq!(heading.expected.as_deref(), Some("Log In"));
    assert_eq!(heading.actual.as_deref(), Some("Sign In"));
    assert_eq!(heading.step_index, 1);
}

// =========================================================================
// Failures stay isolated
// =========================================================================

#[test]
fn missing_credentials_fail_only_cases_that_need_them() {
    let catalog = catalog_without_credentials();
    let results = run_all(SiteBehavior::default(), &catalog, &[BrowserEngine::Chromium], 1);

    let failed: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    assert_eq!(failed.len(), 2);
    for r in failed {
        let failure = r.failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::MissingCredential);
        assert!(failure.message.contains("HUDL_"));
    }
    assert!(!find(&results, "(registered email)").passed);
    assert!(!find(&results, "dashboard with valid credentials").passed);
}

#[test]
fn illegal_step_is_refused_before_touching_the_page() {
    let scenario = Scenario {
        name: "password before email".into(),
        group: "Broken".into(),
        entry: EntryPoint::LoginIdentifier,
        per_viewport: false,
        steps: vec![ScenarioStep::SubmitPassword {
            password: FixtureRef::InvalidPassword,
        }],
    };
    let case = ScenarioCase {
        scenario: &scenario,
        viewport: None,
        engine: BrowserEngine::Chromium,
    };
    let selectors = SelectorRegistry::default();
    let settings = fast_settings();
    let tracer = TraceLogger::disabled();
    let catalog = catalog();
    let factory = FakeFactory::default();
    let result =
        ScenarioRunner::new(&selectors, &catalog, &settings, &tracer).run_case(&case, &factory);

    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::IllegalTransition);
    assert_eq!(result.final_state, Some(LoginFlowState::OnLoginPage));
    // Only the entry navigation reached the browser
    assert_eq!(factory.log_entries().len(), 1);
}

#[test]
fn session_that_cannot_open_is_a_setup_failure() {
    let matrix = ScenarioMatrix::hudl_login();
    let cases = matrix.cases(&[BrowserEngine::Firefox]);
    let selectors = SelectorRegistry::default();
    let settings = fast_settings();
    let tracer = TraceLogger::disabled();
    let catalog = catalog();
    let factory = FakeFactory {
        fail_to_open: true,
        ..FakeFactory::default()
    };
    let results =
        ScenarioRunner::new(&selectors, &catalog, &settings, &tracer).run_cases(&cases, &factory, 4);

    assert_eq!(results.len(), 15);
    for r in &results {
        assert!(!r.passed);
        let failure = r.failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::Session);
        assert_eq!(failure.step_index, None);
        assert_eq!(r.steps_run, 0);
        assert_eq!(r.final_state, None);
    }
}

#[test]
fn stalled_login_page_is_a_navigation_timeout() {
    let catalog = catalog();
    let behavior = SiteBehavior {
        stalled_url: Some("identity.hudl.com".into()),
        ..SiteBehavior::default()
    };
    let results = run_all(behavior, &catalog, &[BrowserEngine::Chromium], 1);
    assert_eq!(results.len(), 15);

    for r in &results {
        if r.group == NAVIGATION_GROUP {
            // In-app navigation never touches the identity endpoint
            assert!(r.passed, "{} failed: {:?}", r.title, r.failure);
            continue;
        }
        assert!(!r.passed, "{} should fail", r.title);
        let failure = r.failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::NavigationTimeout);
        assert!(failure.message.contains("75ms"), "{}", failure.message);
    }

    // Direct entry fails before any step; the login step fails at step 0
    let entry = find(&results, "should have a continue button");
    assert_eq!(entry.failure.as_ref().unwrap().step_index, None);
    let login = find(&results, "dashboard with valid credentials");
    assert_eq!(login.failure.as_ref().unwrap().step_index, Some(0));
    assert_eq!(login.final_state, Some(LoginFlowState::Anonymous));
}

#[test]
fn wrapped_auth_messages_still_match() {
    let catalog = catalog();
    let behavior = SiteBehavior {
        wrap_auth_messages: true,
        ..SiteBehavior::default()
    };
    let results = run_all(behavior, &catalog, &[BrowserEngine::Chromium], 1);
    for r in &results {
        assert!(r.passed, "{} failed: {:?}", r.title, r.assertion_results);
    }
}

#[test]
fn form_reload_after_continue_does_not_fail_expectations() {
    let matrix = ScenarioMatrix::hudl_login();
    let cases = matrix.cases(&[BrowserEngine::Webkit]);
    let selectors = SelectorRegistry::default();
    let settings = RunSettings {
        wait: WaitOptions::new(Duration::from_millis(500), Duration::from_millis(2)),
        ..fast_settings()
    };
    let tracer = TraceLogger::disabled();
    let catalog = catalog();
    let factory = FakeFactory::new(SiteBehavior {
        reload_read_failures: 3,
        ..SiteBehavior::default()
    });
    let results =
        ScenarioRunner::new(&selectors, &catalog, &settings, &tracer).run_cases(&cases, &factory, 2);

    assert_eq!(results.len(), 15);
    for r in &results {
        assert!(r.passed, "{} failed: {:?}", r.title, r.assertion_results);
    }
}

#[test]
fn failing_case_does_not_stop_later_steps_or_cases() {
    let scenario = Scenario {
        name: "two expectation steps".into(),
        group: "Checks".into(),
        entry: EntryPoint::LoginIdentifier,
        per_viewport: false,
        steps: vec![
            ScenarioStep::Expect {
                expectations: vec![Expectation::visible(SelectorName::PasswordField)],
            },
            ScenarioStep::ClickContinue,
            ScenarioStep::Expect {
                expectations: vec![Expectation::required_field_message(
                    SelectorName::EmailField,
                )],
            },
        ],
    };
    let result = run_one(&scenario, SiteBehavior::default(), &catalog());
    assert!(!result.passed);
    assert!(result.failure.is_none());
    assert_eq!(result.steps_run, 3);
    assert_eq!(result.assertion_results.len(), 2);
    assert!(!result.assertion_results[0].passed);
    assert!(result.assertion_results[1].passed);
}

// =========================================================================
// Parallel workers
// =========================================================================

#[test]
fn parallel_run_keeps_matrix_order() {
    let catalog = catalog();
    let engines = [BrowserEngine::Chromium, BrowserEngine::Webkit];
    let sequential = run_all(SiteBehavior::default(), &catalog, &engines, 1);
    let parallel = run_all(SiteBehavior::default(), &catalog, &engines, 6);

    let titles = |rs: &[ScenarioResult]| rs.iter().map(|r| r.title.clone()).collect::<Vec<_>>();
    assert_eq!(titles(&sequential), titles(&parallel));
    assert!(parallel.iter().all(|r| r.passed));
}

#[test]
fn more_workers_than_cases_is_fine() {
    let matrix = ScenarioMatrix::hudl_login();
    let cases: Vec<_> = matrix
        .cases(&[BrowserEngine::Chromium])
        .into_iter()
        .take(2)
        .collect();
    let selectors = SelectorRegistry::default();
    let settings = RunSettings {
        base_url: "https://www.hudl.com/".into(),
        ..fast_settings()
    };
    let tracer = TraceLogger::disabled();
    let catalog = catalog();
    let factory = FakeFactory::default();
    let results = ScenarioRunner::new(&selectors, &catalog, &settings, &tracer)
        .run_cases(&cases, &factory, 32);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.passed));
    assert_eq!(
        factory.log_entries().first().map(String::as_str),
        Some("navigate https://www.hudl.com/")
    );
}

// =========================================================================
// Step trace
// =========================================================================

#[test]
fn trace_file_records_every_executed_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(path.to_str().unwrap());
    assert!(tracer.is_enabled());

    let matrix = ScenarioMatrix::hudl_login();
    let scenario = matrix
        .scenarios
        .iter()
        .find(|s| s.name.contains("(unregistered email)"))
        .unwrap();
    let case = ScenarioCase {
        scenario,
        viewport: None,
        engine: BrowserEngine::Webkit,
    };
    let selectors = SelectorRegistry::default();
    let settings = fast_settings();
    let catalog = catalog();
    let result = ScenarioRunner::new(&selectors, &catalog, &settings, &tracer)
        .run_case(&case, &FakeFactory::default());
    assert!(result.passed);
    drop(tracer);

    let content = std::fs::read_to_string(&path).unwrap();
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["action"], "submit_email");
    assert_eq!(events[0]["state_before"], "OnLoginPage");
    assert_eq!(events[0]["state_after"], "PasswordPromptShown(Unregistered)");
    assert_eq!(events[1]["action"], "submit_password");
    assert_eq!(events[1]["state_after"], "AuthError(UnknownUser)");
    assert_eq!(events[2]["action"], "expect");
    assert_eq!(events[2]["outcome"], "passed");
    assert!(events.iter().all(|e| e["scenario"] == result.title.as_str()));
}
