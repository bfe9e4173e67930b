use serde::{Deserialize, Serialize};

use crate::fixtures::catalog::FixtureRef;
use crate::selectors::registry::SelectorName;

/// Computed `color` of inline errors, exactly as the browser serializes it.
pub const ERROR_COLOR: &str = "rgb(232, 28, 0)";

/// Pattern the URL must match after reaching the login page.
pub const LOGIN_URL_PATTERN: &str = r".*/login";

/// What an expectation observes.
///
/// Written in scenario files as the bare element or fixture name; the two
/// name sets are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    /// A registered element
    Element(SelectorName),
    /// The input whose `value` attribute holds this fixture
    InputWithValue(FixtureRef),
}

impl From<SelectorName> for Target {
    fn from(name: SelectorName) -> Self {
        Target::Element(name)
    }
}

/// A single observation to verify against the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    Visible { target: Target },

    Enabled { target: Target },

    /// Trimmed text content equals `expected` exactly
    HasText { target: Target, expected: String },

    ContainsText { target: Target, expected: String },

    /// Computed style property equals the serialized `expected` value
    CssEquals {
        target: Target,
        property: String,
        expected: String,
    },

    HasAttribute { target: Target, attribute: String },

    /// Current URL matches a regular expression
    UrlMatches { pattern: String },

    /// Native required-field message, worded per browser engine
    RequiredFieldMessage { target: Target },
}

impl Expectation {
    pub fn visible(target: impl Into<Target>) -> Self {
        Expectation::Visible {
            target: target.into(),
        }
    }

    pub fn enabled(target: impl Into<Target>) -> Self {
        Expectation::Enabled {
            target: target.into(),
        }
    }

    pub fn has_text(target: impl Into<Target>, expected: &str) -> Self {
        Expectation::HasText {
            target: target.into(),
            expected: expected.to_string(),
        }
    }

    pub fn contains_text(target: impl Into<Target>, expected: &str) -> Self {
        Expectation::ContainsText {
            target: target.into(),
            expected: expected.to_string(),
        }
    }

    /// The element renders in the product's error color.
    pub fn error_color(target: impl Into<Target>) -> Self {
        Expectation::CssEquals {
            target: target.into(),
            property: "color".into(),
            expected: ERROR_COLOR.into(),
        }
    }

    pub fn has_attribute(target: impl Into<Target>, attribute: &str) -> Self {
        Expectation::HasAttribute {
            target: target.into(),
            attribute: attribute.to_string(),
        }
    }

    pub fn url_matches(pattern: &str) -> Self {
        Expectation::UrlMatches {
            pattern: pattern.to_string(),
        }
    }

    pub fn required_field_message(target: impl Into<Target>) -> Self {
        Expectation::RequiredFieldMessage {
            target: target.into(),
        }
    }

    /// Variant name for reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expectation::Visible { .. } => "Visible",
            Expectation::Enabled { .. } => "Enabled",
            Expectation::HasText { .. } => "HasText",
            Expectation::ContainsText { .. } => "ContainsText",
            Expectation::CssEquals { .. } => "CssEquals",
            Expectation::HasAttribute { .. } => "HasAttribute",
            Expectation::UrlMatches { .. } => "UrlMatches",
            Expectation::RequiredFieldMessage { .. } => "RequiredFieldMessage",
        }
    }
}
