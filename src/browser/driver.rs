use std::time::Duration;

use crate::browser::engine::BrowserEngine;
use crate::browser::viewport::ViewportConfig;
use crate::error::HarnessError;

// ============================================================================
// PageDriver trait: the only way the suite touches a browser
// ============================================================================

/// One live, exclusively-owned browser page.
///
/// Interactions (`click`, `fill`) wait for their target to become
/// actionable for at most `timeout` and fail with
/// `HarnessError::LocateTimeout` otherwise. `navigate` is bounded the same
/// way and fails with `HarnessError::NavigationTimeout`. Reads are
/// instantaneous snapshots; retrying them is the assertion layer's job.
pub trait PageDriver {
    /// Load a URL and wait at most `timeout` for it to finish loading.
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), HarnessError>;

    fn click(&mut self, selector: &str, timeout: Duration) -> Result<(), HarnessError>;

    /// Replace the value of an input.
    fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> Result<(), HarnessError>;

    fn current_url(&mut self) -> Result<String, HarnessError>;

    fn is_visible(&mut self, selector: &str) -> Result<bool, HarnessError>;

    fn is_enabled(&mut self, selector: &str) -> Result<bool, HarnessError>;

    /// `textContent` of the first match, `None` if nothing matches.
    fn text_content(&mut self, selector: &str) -> Result<Option<String>, HarnessError>;

    /// Computed style property as the browser serializes it.
    fn computed_style(
        &mut self,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>, HarnessError>;

    /// Attribute value, `None` if the element or the attribute is absent.
    fn attribute(&mut self, selector: &str, name: &str) -> Result<Option<String>, HarnessError>;

    /// Native constraint-validation message of a form control.
    fn validation_message(&mut self, selector: &str) -> Result<Option<String>, HarnessError>;
}

// ============================================================================
// SessionFactory: one isolated session per scenario case
// ============================================================================

/// Opens fresh browser contexts. Shared across worker threads; every
/// session it returns is owned by exactly one case and dropped after it.
pub trait SessionFactory: Sync {
    fn open(
        &self,
        engine: BrowserEngine,
        viewport: Option<&ViewportConfig>,
    ) -> Result<Box<dyn PageDriver>, HarnessError>;
}
