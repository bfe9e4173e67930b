use regex::Regex;

use crate::assertion::expectation::{Expectation, Target};
use crate::assertion::wait::{WaitOptions, poll_until};
use crate::browser::driver::PageDriver;
use crate::browser::engine::BrowserEngine;
use crate::error::HarnessError;
use crate::fixtures::catalog::TestDataCatalog;
use crate::scenario::scenario_model::AssertionResult;
use crate::selectors::registry::SelectorRegistry;

/// One snapshot of what an expectation looks at.
struct Observation {
    passed: bool,
    actual: Option<String>,
}

impl Observation {
    fn new(passed: bool, actual: Option<String>) -> Self {
        Self { passed, actual }
    }
}

/// Judges expectations against a live page, retrying each until it holds
/// or the expect timeout elapses.
pub struct AssertionEvaluator<'a> {
    selectors: &'a SelectorRegistry,
    catalog: &'a TestDataCatalog,
    engine: BrowserEngine,
    wait: WaitOptions,
}

impl<'a> AssertionEvaluator<'a> {
    pub fn new(
        selectors: &'a SelectorRegistry,
        catalog: &'a TestDataCatalog,
        engine: BrowserEngine,
        wait: WaitOptions,
    ) -> Self {
        Self {
            selectors,
            catalog,
            engine,
            wait,
        }
    }

    /// Evaluate a list of expectations in order.
    pub fn evaluate_all(
        &self,
        page: &mut dyn PageDriver,
        expectations: &[Expectation],
        step_index: usize,
    ) -> Vec<AssertionResult> {
        expectations
            .iter()
            .map(|e| self.evaluate(page, e, step_index))
            .collect()
    }

    /// Evaluate a single expectation.
    pub fn evaluate(
        &self,
        page: &mut dyn PageDriver,
        expectation: &Expectation,
        step_index: usize,
    ) -> AssertionResult {
        let failed = |expected: Option<String>, message: String| AssertionResult {
            step_index,
            expectation: expectation.clone(),
            passed: false,
            expected,
            actual: None,
            message: Some(message),
        };

        let expected = self.expected_value(expectation);

        let url_pattern = match expectation {
            Expectation::UrlMatches { pattern } => match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    let err = HarnessError::Pattern {
                        pattern: pattern.clone(),
                        source: e,
                    };
                    return failed(Some(expected), err.to_string());
                }
            },
            _ => None,
        };

        let selector = match self.target_of(expectation).map(|t| self.locate(t)).transpose() {
            Ok(s) => s,
            Err(e) => return failed(Some(expected), e.to_string()),
        };
        let selector = selector.as_deref().unwrap_or_default();

        let outcome = poll_until(&self.wait, || {
            let obs = self.observe(page, expectation, selector, &expected, url_pattern.as_ref())?;
            Ok((obs.passed, obs.actual))
        });

        match outcome {
            Ok(outcome) => {
                let passed = outcome.is_ready();
                let actual = outcome.into_inner();
                let message = (!passed)
                    .then(|| self.mismatch_message(expectation, selector, &expected, &actual));
                AssertionResult {
                    step_index,
                    expectation: expectation.clone(),
                    passed,
                    expected: Some(expected),
                    actual,
                    message,
                }
            }
            Err(e) => failed(Some(expected), format!("Failed to observe page: {}", e)),
        }
    }

    fn target_of(&self, expectation: &Expectation) -> Option<Target> {
        match expectation {
            Expectation::Visible { target }
            | Expectation::Enabled { target }
            | Expectation::HasText { target, .. }
            | Expectation::ContainsText { target, .. }
            | Expectation::CssEquals { target, .. }
            | Expectation::HasAttribute { target, .. }
            | Expectation::RequiredFieldMessage { target } => Some(*target),
            Expectation::UrlMatches { .. } => None,
        }
    }

    /// CSS locator for a target.
    pub fn locate(&self, target: Target) -> Result<String, HarnessError> {
        match target {
            Target::Element(name) => Ok(self.selectors.get(name).to_string()),
            Target::InputWithValue(fixture) => {
                let value = self.catalog.resolve(fixture)?;
                Ok(SelectorRegistry::value_locator(&value))
            }
        }
    }

    /// The literal an expectation compares against.
    fn expected_value(&self, expectation: &Expectation) -> String {
        match expectation {
            Expectation::Visible { .. } => "visible".into(),
            Expectation::Enabled { .. } => "enabled".into(),
            Expectation::HasText { expected, .. }
            | Expectation::ContainsText { expected, .. }
            | Expectation::CssEquals { expected, .. } => expected.clone(),
            Expectation::HasAttribute { attribute, .. } => format!("[{}]", attribute),
            Expectation::UrlMatches { pattern } => pattern.clone(),
            Expectation::RequiredFieldMessage { .. } => {
                self.engine.required_field_message().to_string()
            }
        }
    }

    fn observe(
        &self,
        page: &mut dyn PageDriver,
        expectation: &Expectation,
        selector: &str,
        expected: &str,
        url_pattern: Option<&Regex>,
    ) -> Result<Observation, HarnessError> {
        match expectation {
            Expectation::Visible { .. } => {
                let visible = page.is_visible(selector)?;
                Ok(Observation::new(visible, Some(describe(visible, "visible", "hidden"))))
            }
            Expectation::Enabled { .. } => {
                let enabled = page.is_enabled(selector)?;
                Ok(Observation::new(enabled, Some(describe(enabled, "enabled", "disabled"))))
            }
            Expectation::HasText { .. } => {
                let text = page.text_content(selector)?.map(|t| normalize_whitespace(&t));
                Ok(Observation::new(text.as_deref() == Some(expected), text))
            }
            Expectation::ContainsText { .. } => {
                let text = page.text_content(selector)?.map(|t| normalize_whitespace(&t));
                let needle = normalize_whitespace(expected);
                let passed = text.as_deref().is_some_and(|t| t.contains(&needle));
                Ok(Observation::new(passed, text))
            }
            Expectation::CssEquals { property, .. } => {
                let value = page.computed_style(selector, property)?;
                Ok(Observation::new(value.as_deref() == Some(expected), value))
            }
            Expectation::HasAttribute { attribute, .. } => {
                let value = page.attribute(selector, attribute)?;
                Ok(Observation::new(value.is_some(), value))
            }
            Expectation::UrlMatches { .. } => {
                let url = page.current_url()?;
                let passed = url_pattern.is_some_and(|re| re.is_match(&url));
                Ok(Observation::new(passed, Some(url)))
            }
            Expectation::RequiredFieldMessage { .. } => {
                let message = page.validation_message(selector)?;
                Ok(Observation::new(message.as_deref() == Some(expected), message))
            }
        }
    }

    fn mismatch_message(
        &self,
        expectation: &Expectation,
        selector: &str,
        expected: &str,
        actual: &Option<String>,
    ) -> String {
        let actual = actual.as_deref().unwrap_or("<none>");
        match expectation {
            Expectation::Visible { .. } => format!("Element '{}' is not visible", selector),
            Expectation::Enabled { .. } => format!("Element '{}' is not enabled", selector),
            Expectation::HasText { .. } => format!(
                "Element '{}' text: expected \"{}\", actual \"{}\"",
                selector, expected, actual
            ),
            Expectation::ContainsText { .. } => format!(
                "Element '{}' text does not contain \"{}\" (actual \"{}\")",
                selector, expected, actual
            ),
            Expectation::CssEquals { property, .. } => format!(
                "Element '{}' {}: expected \"{}\", actual \"{}\"",
                selector, property, expected, actual
            ),
            Expectation::HasAttribute { attribute, .. } => {
                format!("Element '{}' has no '{}' attribute", selector, attribute)
            }
            Expectation::UrlMatches { pattern } => {
                format!("URL \"{}\" does not match /{}/", actual, pattern)
            }
            Expectation::RequiredFieldMessage { .. } => format!(
                "{} validation message on '{}': expected \"{}\", actual \"{}\"",
                self.engine, selector, expected, actual
            ),
        }
    }
}

fn describe(flag: bool, yes: &str, no: &str) -> String {
    if flag { yes.to_string() } else { no.to_string() }
}

/// Trim and collapse runs of whitespace, as text matchers compare.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
