use crate::assertion::expectation::{Expectation, LOGIN_URL_PATTERN, Target};
use crate::browser::engine::BrowserEngine;
use crate::browser::viewport::ViewportConfig;
use crate::fixtures::catalog::FixtureRef;
use crate::flow::state::AuthErrorReason;
use crate::scenario::scenario_model::{EntryPoint, Scenario, ScenarioStep};
use crate::selectors::registry::SelectorName;

pub const NAVIGATION_GROUP: &str = "Navigation to Login Page";
pub const LOGIN_PAGE_GROUP: &str = "Login Page";
pub const SUCCESS_GROUP: &str = "Successful Login";

// ============================================================================
// Scenario cases
// ============================================================================

/// A scenario bound to one engine and (optionally) one viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioCase<'a> {
    pub scenario: &'a Scenario,
    pub viewport: Option<ViewportConfig>,
    pub engine: BrowserEngine,
}

impl ScenarioCase<'_> {
    /// `"<group> - <viewport> › <name> [engine]"`; the viewport part only
    /// appears for per-viewport scenarios.
    pub fn title(&self) -> String {
        match &self.viewport {
            Some(vp) => format!(
                "{} - {} \u{203a} {} [{}]",
                self.scenario.group, vp.name, self.scenario.name, self.engine
            ),
            None => format!(
                "{} \u{203a} {} [{}]",
                self.scenario.group, self.scenario.name, self.engine
            ),
        }
    }
}

/// Narrows the expanded matrix from the command line.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Viewport names to keep (case-insensitive); empty keeps all
    pub viewports: Vec<String>,
    /// Substring the case title must contain
    pub grep: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &ScenarioCase<'_>) -> bool {
        let viewport_ok = self.viewports.is_empty()
            || case.viewport.as_ref().is_none_or(|vp| {
                self.viewports
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(&vp.name))
            });
        let grep_ok = self
            .grep
            .as_deref()
            .is_none_or(|needle| case.title().contains(needle));
        viewport_ok && grep_ok
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// The enumerated scenarios plus the viewports they expand over.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioMatrix {
    pub scenarios: Vec<Scenario>,
    pub viewports: Vec<ViewportConfig>,
}

impl ScenarioMatrix {
    pub fn new(scenarios: Vec<Scenario>, viewports: Vec<ViewportConfig>) -> Self {
        Self {
            scenarios,
            viewports,
        }
    }

    /// Expand into concrete cases, engine-major, in declaration order.
    pub fn cases(&self, engines: &[BrowserEngine]) -> Vec<ScenarioCase<'_>> {
        let mut cases = Vec::new();
        for &engine in engines {
            for scenario in &self.scenarios {
                if scenario.per_viewport {
                    for vp in &self.viewports {
                        cases.push(ScenarioCase {
                            scenario,
                            viewport: Some(vp.clone()),
                            engine,
                        });
                    }
                } else {
                    cases.push(ScenarioCase {
                        scenario,
                        viewport: None,
                        engine,
                    });
                }
            }
        }
        cases
    }

    pub fn filtered_cases(
        &self,
        engines: &[BrowserEngine],
        filter: &CaseFilter,
    ) -> Vec<ScenarioCase<'_>> {
        self.cases(engines)
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect()
    }

    /// The product's login journey.
    pub fn hudl_login() -> Self {
        let mut scenarios = navigation_scenarios();
        scenarios.extend(login_page_scenarios());
        scenarios.push(success_scenario());
        Self::new(scenarios, ViewportConfig::presets())
    }
}

fn scenario(group: &str, name: &str, entry: EntryPoint, steps: Vec<ScenarioStep>) -> Scenario {
    Scenario {
        name: name.to_string(),
        group: group.to_string(),
        entry,
        per_viewport: false,
        steps,
    }
}

fn expect(expectations: Vec<Expectation>) -> ScenarioStep {
    ScenarioStep::Expect { expectations }
}

/// Inline error shown in the error color next to the error icon.
fn inline_error(element: SelectorName, text: &str) -> Vec<Expectation> {
    vec![
        Expectation::visible(element),
        Expectation::contains_text(element, text),
        Expectation::error_color(element),
        Expectation::visible(SelectorName::ErrorIcon),
        Expectation::error_color(SelectorName::ErrorIcon),
    ]
}

fn navigation_scenarios() -> Vec<Scenario> {
    let mut scenarios = vec![
        scenario(
            NAVIGATION_GROUP,
            "should display the login sub nav when clicking the login button",
            EntryPoint::AppRoot,
            vec![
                ScenarioStep::OpenLoginSubNav,
                expect(vec![Expectation::visible(SelectorName::SubNavMenu)]),
            ],
        ),
        scenario(
            NAVIGATION_GROUP,
            "should display the Hudl login link in the sub nav",
            EntryPoint::AppRoot,
            vec![
                ScenarioStep::OpenLoginSubNav,
                expect(vec![Expectation::visible(SelectorName::HudlLoginLink)]),
            ],
        ),
        scenario(
            NAVIGATION_GROUP,
            "should navigate to the login page when clicking the Hudl login link",
            EntryPoint::AppRoot,
            vec![
                ScenarioStep::NavigateToLoginPage,
                expect(vec![
                    Expectation::url_matches(LOGIN_URL_PATTERN),
                    Expectation::has_text(SelectorName::PageHeading, "Log In"),
                ]),
            ],
        ),
    ];
    for s in &mut scenarios {
        s.per_viewport = true;
    }
    scenarios
}

fn login_page_scenarios() -> Vec<Scenario> {
    let on_login_page = |name: &str, steps: Vec<ScenarioStep>| {
        scenario(LOGIN_PAGE_GROUP, name, EntryPoint::LoginIdentifier, steps)
    };

    vec![
        on_login_page(
            "should have an email field with proper label",
            vec![expect(vec![
                Expectation::visible(SelectorName::EmailField),
                Expectation::enabled(SelectorName::EmailField),
                Expectation::contains_text(SelectorName::EmailLabel, "Email*"),
            ])],
        ),
        on_login_page(
            "should have a continue button",
            vec![expect(vec![Expectation::visible(SelectorName::ContinueButton)])],
        ),
        on_login_page(
            "should validate required email field",
            vec![
                ScenarioStep::ClickContinue,
                expect(vec![Expectation::required_field_message(
                    SelectorName::EmailField,
                )]),
            ],
        ),
        on_login_page(
            "should show error for invalid email format",
            vec![
                ScenarioStep::SubmitEmail {
                    email: FixtureRef::InvalidEmail,
                },
                expect(inline_error(SelectorName::EmailError, "Enter a valid email")),
            ],
        ),
        on_login_page(
            "should display password field after submitting valid email",
            vec![
                ScenarioStep::SubmitEmail {
                    email: FixtureRef::GenericEmail,
                },
                expect(vec![
                    Expectation::visible(SelectorName::PasswordField),
                    Expectation::has_attribute(
                        Target::InputWithValue(FixtureRef::GenericEmail),
                        "readonly",
                    ),
                ]),
            ],
        ),
        on_login_page(
            "should show error for invalid credentials (registered email)",
            vec![
                ScenarioStep::SubmitEmail {
                    email: FixtureRef::ValidEmail,
                },
                ScenarioStep::SubmitPassword {
                    password: FixtureRef::InvalidPassword,
                },
                expect(inline_error(
                    SelectorName::PasswordError,
                    AuthErrorReason::IncorrectCredentials.message(),
                )),
            ],
        ),
        on_login_page(
            "should show error for invalid credentials (unregistered email)",
            vec![
                ScenarioStep::SubmitEmail {
                    email: FixtureRef::ValidUnregisteredEmail,
                },
                ScenarioStep::SubmitPassword {
                    password: FixtureRef::InvalidPassword,
                },
                expect(inline_error(
                    SelectorName::PasswordError,
                    AuthErrorReason::UnknownUser.message(),
                )),
            ],
        ),
        on_login_page(
            "should show error for invalid credentials (no password)",
            vec![
                ScenarioStep::SubmitEmail {
                    email: FixtureRef::ValidUnregisteredEmail,
                },
                ScenarioStep::ClickContinue,
                expect(vec![Expectation::required_field_message(
                    SelectorName::PasswordField,
                )]),
            ],
        ),
    ]
}

fn success_scenario() -> Scenario {
    scenario(
        SUCCESS_GROUP,
        "should navigate to dashboard with valid credentials",
        EntryPoint::Blank,
        vec![
            ScenarioStep::Login {
                email: FixtureRef::ValidEmail,
                password: FixtureRef::ValidPassword,
            },
            expect(vec![Expectation::visible(SelectorName::Dashboard)]),
        ],
    )
}
