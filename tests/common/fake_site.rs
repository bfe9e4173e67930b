use std::sync::{Arc, Mutex};
use std::time::Duration;

use hudl_login_e2e::assertion::expectation::ERROR_COLOR;
use hudl_login_e2e::browser::driver::{PageDriver, SessionFactory};
use hudl_login_e2e::browser::engine::BrowserEngine;
use hudl_login_e2e::browser::viewport::ViewportConfig;
use hudl_login_e2e::error::HarnessError;
use hudl_login_e2e::flow::state::{AuthErrorReason, is_email_shaped};
use hudl_login_e2e::selectors::registry::{SelectorName, SelectorRegistry};

pub const REGISTERED_EMAIL: &str = "coach@example.com";
pub const REGISTERED_PASSWORD: &str = "s3cret-Passw0rd";
pub const LOGIN_PAGE_URL: &str = "https://www.hudl.com/login";

/// How the fake product behaves. The default is the real product.
#[derive(Debug, Clone)]
pub struct SiteBehavior {
    pub registered_email: String,
    pub registered_password: String,
    pub error_color: String,
    pub heading: String,
    /// Show the incorrect-credentials message for unknown users and vice versa
    pub swap_auth_messages: bool,
    /// Login sub nav never opens below this viewport width
    pub hide_sub_nav_below_width: Option<u32>,
    /// Locators that never match anything
    pub missing_selectors: Vec<String>,
    /// Replace the engine's native required-field message
    pub validation_message_override: Option<String>,
    /// Break the auth error text across lines, as templated markup does
    pub wrap_auth_messages: bool,
    /// Element reads that fail after each Continue press while the form reloads
    pub reload_read_failures: usize,
    /// Page loads of URLs containing this never finish
    pub stalled_url: Option<String>,
}

impl Default for SiteBehavior {
    fn default() -> Self {
        Self {
            registered_email: REGISTERED_EMAIL.into(),
            registered_password: REGISTERED_PASSWORD.into(),
            error_color: ERROR_COLOR.into(),
            heading: "Log In".into(),
            swap_auth_messages: false,
            hide_sub_nav_below_width: None,
            missing_selectors: Vec::new(),
            validation_message_override: None,
            wrap_auth_messages: false,
            reload_read_failures: 0,
            stalled_url: None,
        }
    }
}

/// Shared record of every driver command across sessions.
pub type ActionLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, Default)]
struct LoginForm {
    email: String,
    password: String,
    submitted_email: Option<String>,
    email_error: Option<String>,
    password_error: Option<String>,
    email_required: bool,
    password_required: bool,
}

#[derive(Debug, Clone)]
enum Page {
    Blank,
    Home { sub_nav_open: bool },
    Login(LoginForm),
    Dashboard,
}

/// In-memory stand-in for the marketing site and the hosted login form.
pub struct FakeSite {
    behavior: SiteBehavior,
    selectors: SelectorRegistry,
    engine: BrowserEngine,
    viewport_width: u32,
    page: Page,
    url: String,
    log: ActionLog,
    /// Reads left to fail before the reloaded page answers
    reloading: usize,
}

impl FakeSite {
    pub fn new(behavior: SiteBehavior, engine: BrowserEngine, viewport_width: u32) -> Self {
        Self {
            behavior,
            selectors: SelectorRegistry::default(),
            engine,
            viewport_width,
            page: Page::Blank,
            url: "about:blank".into(),
            log: ActionLog::default(),
            reloading: 0,
        }
    }

    pub fn with_log(mut self, log: ActionLog) -> Self {
        self.log = log;
        self
    }

    fn record(&self, entry: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(entry);
        }
    }

    fn element(&self, selector: &str) -> Option<SelectorName> {
        if self.behavior.missing_selectors.iter().any(|s| s == selector) {
            return None;
        }
        SelectorName::ALL
            .into_iter()
            .find(|&name| self.selectors.get(name) == selector)
    }

    fn sub_nav_allowed(&self) -> bool {
        self.behavior
            .hide_sub_nav_below_width
            .is_none_or(|min| self.viewport_width >= min)
    }

    fn visible(&self, selector: &str) -> bool {
        if let Page::Login(form) = &self.page {
            if let Some(email) = &form.submitted_email {
                if selector == SelectorRegistry::value_locator(email) {
                    return true;
                }
            }
        }

        let Some(name) = self.element(selector) else {
            return false;
        };
        match (&self.page, name) {
            (Page::Home { .. }, SelectorName::LoginButton) => true,
            (Page::Home { sub_nav_open }, SelectorName::SubNavMenu | SelectorName::HudlLoginLink) => {
                *sub_nav_open
            }
            (
                Page::Login(_),
                SelectorName::EmailField
                | SelectorName::EmailLabel
                | SelectorName::ContinueButton
                | SelectorName::PageHeading,
            ) => true,
            (Page::Login(form), SelectorName::EmailError) => form.email_error.is_some(),
            (Page::Login(form), SelectorName::PasswordError) => form.password_error.is_some(),
            (Page::Login(form), SelectorName::ErrorIcon) => {
                form.email_error.is_some() || form.password_error.is_some()
            }
            (Page::Login(form), SelectorName::PasswordField) => form.submitted_email.is_some(),
            (Page::Dashboard, SelectorName::Dashboard) => true,
            _ => false,
        }
    }

    fn locate(&self, selector: &str, timeout: Duration) -> Result<SelectorName, HarnessError> {
        match self.element(selector) {
            Some(name) if self.visible(selector) => Ok(name),
            _ => Err(HarnessError::LocateTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    fn auth_error(&self, registered: bool) -> String {
        let registered = registered != self.behavior.swap_auth_messages;
        let reason = if registered {
            AuthErrorReason::IncorrectCredentials
        } else {
            AuthErrorReason::UnknownUser
        };
        let message = reason.message();
        if self.behavior.wrap_auth_messages {
            message.replacen(' ', "\n      ", 2)
        } else {
            message.to_string()
        }
    }

    /// Fails while the page is mid-reload, like a read whose execution
    /// context was torn down.
    fn settled(&mut self) -> Result<(), HarnessError> {
        if self.reloading == 0 {
            return Ok(());
        }
        self.reloading -= 1;
        Err(HarnessError::SessionProtocol {
            command: "query".into(),
            error: "Execution context was destroyed, most likely because of a navigation".into(),
        })
    }

    fn press_continue(&mut self) {
        let Page::Login(form) = &self.page else {
            return;
        };
        let mut form = form.clone();

        match form.submitted_email.clone() {
            None => {
                if form.email.is_empty() {
                    form.email_required = true;
                } else if !is_email_shaped(&form.email) {
                    form.email_error = Some("Enter a valid email.".into());
                } else {
                    form.email_error = None;
                    form.email_required = false;
                    form.submitted_email = Some(form.email.clone());
                }
            }
            Some(email) => {
                if form.password.is_empty() {
                    form.password_required = true;
                } else {
                    let registered = email == self.behavior.registered_email;
                    if registered && form.password == self.behavior.registered_password {
                        self.page = Page::Dashboard;
                        self.url = "https://www.hudl.com/home".into();
                        return;
                    }
                    form.password_error = Some(self.auth_error(registered));
                }
            }
        }

        self.page = Page::Login(form);
    }
}

impl PageDriver for FakeSite {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), HarnessError> {
        self.record(format!("navigate {}", url));
        if self.behavior.stalled_url.as_deref().is_some_and(|s| url.contains(s)) {
            return Err(HarnessError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        self.url = url.to_string();
        self.page = if url.contains("/login") {
            Page::Login(LoginForm::default())
        } else {
            Page::Home {
                sub_nav_open: false,
            }
        };
        Ok(())
    }

    fn click(&mut self, selector: &str, timeout: Duration) -> Result<(), HarnessError> {
        self.record(format!("click {}", selector));
        match self.locate(selector, timeout)? {
            SelectorName::LoginButton => {
                let open = self.sub_nav_allowed();
                self.page = Page::Home { sub_nav_open: open };
            }
            SelectorName::HudlLoginLink => {
                self.url = LOGIN_PAGE_URL.into();
                self.page = Page::Login(LoginForm::default());
            }
            SelectorName::ContinueButton => {
                self.press_continue();
                self.reloading = self.behavior.reload_read_failures;
            }
            _ => {}
        }
        Ok(())
    }

    fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> Result<(), HarnessError> {
        self.record(format!("fill {} {}", selector, value));
        let name = self.locate(selector, timeout)?;
        if let Page::Login(form) = &mut self.page {
            match name {
                SelectorName::EmailField => form.email = value.to_string(),
                SelectorName::PasswordField => form.password = value.to_string(),
                _ => {}
            }
        }
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, HarnessError> {
        Ok(self.url.clone())
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool, HarnessError> {
        self.settled()?;
        Ok(self.visible(selector))
    }

    fn is_enabled(&mut self, selector: &str) -> Result<bool, HarnessError> {
        self.settled()?;
        Ok(self.visible(selector))
    }

    fn text_content(&mut self, selector: &str) -> Result<Option<String>, HarnessError> {
        self.settled()?;
        if !self.visible(selector) {
            return Ok(None);
        }
        let text = match (&self.page, self.element(selector)) {
            (Page::Login(_), Some(SelectorName::PageHeading)) => Some(self.behavior.heading.clone()),
            (Page::Login(_), Some(SelectorName::EmailLabel)) => Some("\n  Email*\n".to_string()),
            (Page::Login(_), Some(SelectorName::ContinueButton)) => Some("Continue".to_string()),
            (Page::Login(form), Some(SelectorName::EmailError)) => form.email_error.clone(),
            (Page::Login(form), Some(SelectorName::PasswordError)) => form.password_error.clone(),
            _ => Some(String::new()),
        };
        Ok(text)
    }

    fn computed_style(
        &mut self,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>, HarnessError> {
        self.settled()?;
        if !self.visible(selector) {
            return Ok(None);
        }
        let value = match (self.element(selector), property) {
            (
                Some(SelectorName::EmailError | SelectorName::PasswordError | SelectorName::ErrorIcon),
                "color",
            ) => self.behavior.error_color.clone(),
            (_, "color") => "rgb(28, 28, 28)".to_string(),
            _ => String::new(),
        };
        Ok(Some(value))
    }

    fn attribute(&mut self, selector: &str, name: &str) -> Result<Option<String>, HarnessError> {
        self.settled()?;
        if let Page::Login(form) = &self.page {
            if let Some(email) = &form.submitted_email {
                if selector == SelectorRegistry::value_locator(email) {
                    return Ok(match name {
                        "readonly" => Some(String::new()),
                        "value" => Some(email.clone()),
                        _ => None,
                    });
                }
            }
        }
        Ok(None)
    }

    fn validation_message(&mut self, selector: &str) -> Result<Option<String>, HarnessError> {
        self.settled()?;
        let Page::Login(form) = &self.page else {
            return Ok(None);
        };
        let required = match self.element(selector) {
            Some(SelectorName::EmailField) => form.email_required,
            Some(SelectorName::PasswordField) => form.password_required,
            _ => return Ok(None),
        };
        if !required {
            return Ok(Some(String::new()));
        }
        let message = self
            .behavior
            .validation_message_override
            .clone()
            .unwrap_or_else(|| self.engine.required_field_message().to_string());
        Ok(Some(message))
    }
}

/// Opens a fresh `FakeSite` per case and remembers what it opened.
#[derive(Default)]
pub struct FakeFactory {
    pub behavior: SiteBehavior,
    pub log: ActionLog,
    pub opened: Mutex<Vec<(BrowserEngine, Option<String>)>>,
    /// Refuse to open sessions, as when the browser binary is missing
    pub fail_to_open: bool,
}

impl FakeFactory {
    pub fn new(behavior: SiteBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn log_entries(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl SessionFactory for FakeFactory {
    fn open(
        &self,
        engine: BrowserEngine,
        viewport: Option<&ViewportConfig>,
    ) -> Result<Box<dyn PageDriver>, HarnessError> {
        if self.fail_to_open {
            return Err(HarnessError::SessionIo("browser exited during launch".into()));
        }
        if let Ok(mut opened) = self.opened.lock() {
            opened.push((engine, viewport.map(|v| v.name.clone())));
        }
        let width = viewport.map_or(ViewportConfig::desktop().width, |v| v.width);
        Ok(Box::new(
            FakeSite::new(self.behavior.clone(), engine, width).with_log(Arc::clone(&self.log)),
        ))
    }
}
