use serde::{Deserialize, Serialize};

// ============================================================================
// Semantic element names
// ============================================================================

/// Every element the login journey touches or observes.
///
/// The set is closed: a flow action or expectation can only name an element
/// that has a locator in the registry, so a typo is a compile error rather
/// than a locate timeout at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorName {
    // navigation
    LoginButton,
    HudlLoginLink,
    SubNavMenu,
    // login form
    ContinueButton,
    EmailError,
    EmailField,
    EmailLabel,
    ErrorIcon,
    PasswordError,
    PasswordField,
    PageHeading,
    // dashboard
    Dashboard,
}

impl SelectorName {
    pub const ALL: [SelectorName; 12] = [
        SelectorName::LoginButton,
        SelectorName::HudlLoginLink,
        SelectorName::SubNavMenu,
        SelectorName::ContinueButton,
        SelectorName::EmailError,
        SelectorName::EmailField,
        SelectorName::EmailLabel,
        SelectorName::ErrorIcon,
        SelectorName::PasswordError,
        SelectorName::PasswordField,
        SelectorName::PageHeading,
        SelectorName::Dashboard,
    ];
}

// ============================================================================
// Registry
// ============================================================================

/// Locators for the in-app navigation bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSelectors {
    pub login_button: String,
    pub hudl_login_link: String,
    pub sub_nav_menu: String,
}

impl Default for NavigationSelectors {
    fn default() -> Self {
        Self {
            login_button: r#"[data-qa-id="login-select"]"#.into(),
            hudl_login_link: r#"[data-qa-id="login-hudl"]"#.into(),
            sub_nav_menu: ".mainnav__sub > .subnav__inner > .subnav__group > .subnav__items".into(),
        }
    }
}

/// Locators for the identity provider's hosted login form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginFormSelectors {
    pub continue_button: String,
    pub email_error: String,
    pub email_field: String,
    pub email_label: String,
    pub error_icon: String,
    pub password_error: String,
    pub password_field: String,
    pub page_heading: String,
}

impl Default for LoginFormSelectors {
    fn default() -> Self {
        Self {
            continue_button: r#"[data-action-button-primary="true"]"#.into(),
            email_error: "#error-element-username".into(),
            email_field: "#username".into(),
            email_label: r#"[data-dynamic-label-for="username"]"#.into(),
            error_icon: ".ulp-input-error-icon".into(),
            password_error: "#error-element-password".into(),
            password_field: "#password".into(),
            page_heading: "h1".into(),
        }
    }
}

/// Locators for the signed-in area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSelectors {
    pub container: String,
}

impl Default for DashboardSelectors {
    fn default() -> Self {
        Self {
            container: "#koMain".into(),
        }
    }
}

/// Immutable name → CSS locator table, built once and shared by reference.
///
/// Deserializable so a config file can override individual locators;
/// anything omitted keeps the product default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorRegistry {
    pub navigation: NavigationSelectors,
    pub login_form: LoginFormSelectors,
    pub dashboard: DashboardSelectors,
}

impl SelectorRegistry {
    /// Locator for a semantic element name.
    pub fn get(&self, name: SelectorName) -> &str {
        match name {
            SelectorName::LoginButton => &self.navigation.login_button,
            SelectorName::HudlLoginLink => &self.navigation.hudl_login_link,
            SelectorName::SubNavMenu => &self.navigation.sub_nav_menu,
            SelectorName::ContinueButton => &self.login_form.continue_button,
            SelectorName::EmailError => &self.login_form.email_error,
            SelectorName::EmailField => &self.login_form.email_field,
            SelectorName::EmailLabel => &self.login_form.email_label,
            SelectorName::ErrorIcon => &self.login_form.error_icon,
            SelectorName::PasswordError => &self.login_form.password_error,
            SelectorName::PasswordField => &self.login_form.password_field,
            SelectorName::PageHeading => &self.login_form.page_heading,
            SelectorName::Dashboard => &self.dashboard.container,
        }
    }

    /// Attribute locator for an input currently holding `value`.
    pub fn value_locator(value: &str) -> String {
        format!(r#"[value="{}"]"#, value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
