use std::time::Duration;

use tracing::debug;

use crate::browser::driver::PageDriver;
use crate::error::HarnessError;
use crate::selectors::registry::{SelectorName, SelectorRegistry};

/// Identity-provider login-identifier endpoint used for direct entry.
pub const DEFAULT_LOGIN_URL: &str = "https://identity.hudl.com/u/login/identifier?state=hKFo2SBuQ25Dc1I4NEVtdFctcVhoMWdwb0lhZG95MWszLWpmOKFur3VuaXZlcnNhbC1sb2dpbqN0aWTZIGljaFV1YWJiMzZuSXVUMTIxLW82c2tPaVVPYUpRVkYzo2NpZNkgbjEzUmZrSHpLb3phTnhXQzVkWlFvYmVXR2Y0V2pTbjU";

pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Drivers for the legal steps of the login journey.
///
/// Each action is an ordered locate → act sequence. Actions never check
/// their own post-conditions; a step that cannot find its element fails
/// with `LocateTimeout` and everything else is left to expectations.
pub struct FlowActions<'a> {
    selectors: &'a SelectorRegistry,
    login_url: &'a str,
    timeout: Duration,
    navigation_timeout: Duration,
}

impl<'a> FlowActions<'a> {
    pub fn new(selectors: &'a SelectorRegistry, login_url: &'a str, timeout: Duration) -> Self {
        Self {
            selectors,
            login_url,
            timeout,
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
        }
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    fn click(&self, page: &mut dyn PageDriver, name: SelectorName) -> Result<(), HarnessError> {
        debug!(element = ?name, "click");
        page.click(self.selectors.get(name), self.timeout)
    }

    fn fill(
        &self,
        page: &mut dyn PageDriver,
        name: SelectorName,
        value: &str,
    ) -> Result<(), HarnessError> {
        debug!(element = ?name, chars = value.len(), "fill");
        page.fill(self.selectors.get(name), value, self.timeout)
    }

    pub fn open_login_sub_nav(&self, page: &mut dyn PageDriver) -> Result<(), HarnessError> {
        self.click(page, SelectorName::LoginButton)
    }

    pub fn navigate_to_login_page(&self, page: &mut dyn PageDriver) -> Result<(), HarnessError> {
        self.open_login_sub_nav(page)?;
        self.click(page, SelectorName::HudlLoginLink)
    }

    pub fn click_continue(&self, page: &mut dyn PageDriver) -> Result<(), HarnessError> {
        self.click(page, SelectorName::ContinueButton)
    }

    pub fn submit_email(&self, page: &mut dyn PageDriver, email: &str) -> Result<(), HarnessError> {
        self.fill(page, SelectorName::EmailField, email)?;
        self.click_continue(page)
    }

    pub fn submit_password(
        &self,
        page: &mut dyn PageDriver,
        password: &str,
    ) -> Result<(), HarnessError> {
        self.fill(page, SelectorName::PasswordField, password)?;
        self.click_continue(page)
    }

    /// Enter through the identifier endpoint, skipping in-app navigation.
    pub fn login(
        &self,
        page: &mut dyn PageDriver,
        email: &str,
        password: &str,
    ) -> Result<(), HarnessError> {
        debug!(url = self.login_url, "navigate");
        page.navigate(self.login_url, self.navigation_timeout)?;
        self.submit_email(page, email)?;
        self.submit_password(page, password)
    }
}
