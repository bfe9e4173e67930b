use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Browser engines the suite can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserEngine {
    pub const ALL: [BrowserEngine; 3] = [
        BrowserEngine::Chromium,
        BrowserEngine::Firefox,
        BrowserEngine::Webkit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BrowserEngine::Chromium => "chromium",
            BrowserEngine::Firefox => "firefox",
            BrowserEngine::Webkit => "webkit",
        }
    }

    /// Native `validationMessage` of an empty `required` input.
    ///
    /// Engines word this differently, so expectations must ask the engine
    /// rather than compare against one fixed string.
    pub fn required_field_message(&self) -> &'static str {
        match self {
            BrowserEngine::Webkit => "Fill out this field",
            BrowserEngine::Chromium => "Please fill out this field.",
            BrowserEngine::Firefox => "Please fill out this field.",
        }
    }
}

impl fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrowserEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserEngine::Chromium),
            "firefox" => Ok(BrowserEngine::Firefox),
            "webkit" | "safari" => Ok(BrowserEngine::Webkit),
            other => Err(format!(
                "unknown browser engine '{}' (expected chromium, firefox or webkit)",
                other
            )),
        }
    }
}
