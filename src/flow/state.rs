use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fixtures::catalog::FixtureRef;

// ============================================================================
// Login-flow states
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Email,
    Password,
}

/// Whether the identity provider knows the submitted email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Registered,
    Unregistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorReason {
    /// Registered email, wrong password
    IncorrectCredentials,
    /// Email with no account behind it
    UnknownUser,
}

impl AuthErrorReason {
    /// Error text the provider shows. The two differ on purpose and must
    /// never be interchanged.
    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorReason::IncorrectCredentials => {
                "Your email or password is incorrect. Try again."
            }
            AuthErrorReason::UnknownUser => "Incorrect username or password.",
        }
    }
}

/// A distinguishable point in the login journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginFlowState {
    Anonymous,
    SubNavOpen,
    OnLoginPage,
    /// Email accepted, provider round-trip still in flight
    EmailSubmitted(EmailStatus),
    PasswordPromptShown(EmailStatus),
    ValidationError(Field),
    AuthError(AuthErrorReason),
    Authenticated,
}

impl fmt::Display for LoginFlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginFlowState::Anonymous => f.write_str("Anonymous"),
            LoginFlowState::SubNavOpen => f.write_str("SubNavOpen"),
            LoginFlowState::OnLoginPage => f.write_str("OnLoginPage"),
            LoginFlowState::EmailSubmitted(s) => write!(f, "EmailSubmitted({:?})", s),
            LoginFlowState::PasswordPromptShown(s) => write!(f, "PasswordPromptShown({:?})", s),
            LoginFlowState::ValidationError(field) => write!(f, "ValidationError({:?})", field),
            LoginFlowState::AuthError(reason) => write!(f, "AuthError({:?})", reason),
            LoginFlowState::Authenticated => f.write_str("Authenticated"),
        }
    }
}

// ============================================================================
// Inputs and actions
// ============================================================================

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

/// Whether a string is shaped like an email address.
pub fn is_email_shaped(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value)
}

/// How the provider will treat a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputClass {
    Empty,
    MalformedEmail,
    RegisteredEmail,
    UnregisteredEmail,
    CorrectPassword,
    WrongPassword,
}

impl InputClass {
    /// Classify a value typed into the email field.
    ///
    /// Only the environment-supplied account counts as registered.
    pub fn email(fixture: FixtureRef, value: &str) -> Self {
        if value.is_empty() {
            InputClass::Empty
        } else if !is_email_shaped(value) {
            InputClass::MalformedEmail
        } else if fixture == FixtureRef::ValidEmail {
            InputClass::RegisteredEmail
        } else {
            InputClass::UnregisteredEmail
        }
    }

    /// Classify a value typed into the password field.
    pub fn password(fixture: FixtureRef, value: &str) -> Self {
        if value.is_empty() {
            InputClass::Empty
        } else if fixture == FixtureRef::ValidPassword {
            InputClass::CorrectPassword
        } else {
            InputClass::WrongPassword
        }
    }
}

/// A user-meaningful step with its classified inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    OpenLoginSubNav,
    NavigateToLoginPage,
    SubmitEmail(InputClass),
    SubmitPassword(InputClass),
    ClickContinue,
    Login { email: InputClass, password: InputClass },
}

impl FlowAction {
    pub fn name(&self) -> &'static str {
        match self {
            FlowAction::OpenLoginSubNav => "open_login_sub_nav",
            FlowAction::NavigateToLoginPage => "navigate_to_login_page",
            FlowAction::SubmitEmail(_) => "submit_email",
            FlowAction::SubmitPassword(_) => "submit_password",
            FlowAction::ClickContinue => "click_continue",
            FlowAction::Login { .. } => "login",
        }
    }
}

// ============================================================================
// Transitions
// ============================================================================

impl LoginFlowState {
    /// State reached by taking `action` from `self`, or `None` when the
    /// journey offers no such step from here.
    pub fn transition(self, action: FlowAction) -> Option<LoginFlowState> {
        use LoginFlowState::*;

        match (self, action) {
            (Anonymous, FlowAction::OpenLoginSubNav) => Some(SubNavOpen),
            (Anonymous, FlowAction::NavigateToLoginPage) => Some(OnLoginPage),

            (OnLoginPage | ValidationError(Field::Email), FlowAction::SubmitEmail(input)) => {
                match input {
                    InputClass::Empty | InputClass::MalformedEmail => {
                        Some(ValidationError(Field::Email))
                    }
                    InputClass::RegisteredEmail => Some(EmailSubmitted(EmailStatus::Registered)),
                    InputClass::UnregisteredEmail => {
                        Some(EmailSubmitted(EmailStatus::Unregistered))
                    }
                    InputClass::CorrectPassword | InputClass::WrongPassword => None,
                }
            }
            (OnLoginPage | ValidationError(Field::Email), FlowAction::ClickContinue) => {
                Some(ValidationError(Field::Email))
            }

            (PasswordPromptShown(status), FlowAction::SubmitPassword(input)) => match input {
                InputClass::Empty => Some(ValidationError(Field::Password)),
                InputClass::CorrectPassword if status == EmailStatus::Registered => {
                    Some(Authenticated)
                }
                InputClass::CorrectPassword => Some(AuthError(AuthErrorReason::UnknownUser)),
                InputClass::WrongPassword => Some(AuthError(match status {
                    EmailStatus::Registered => AuthErrorReason::IncorrectCredentials,
                    EmailStatus::Unregistered => AuthErrorReason::UnknownUser,
                })),
                _ => None,
            },
            (PasswordPromptShown(_), FlowAction::ClickContinue) => {
                Some(ValidationError(Field::Password))
            }

            // Direct navigation to the identifier endpoint works from anywhere
            (_, FlowAction::Login { email, password }) => OnLoginPage
                .transition(FlowAction::SubmitEmail(email))
                .map(LoginFlowState::settle)
                .and_then(|s| s.transition(FlowAction::SubmitPassword(password))),

            _ => None,
        }
    }

    /// Resolve transient states once the page has settled.
    pub fn settle(self) -> LoginFlowState {
        match self {
            LoginFlowState::EmailSubmitted(status) => LoginFlowState::PasswordPromptShown(status),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoginFlowState::AuthError(_) | LoginFlowState::Authenticated
        )
    }
}
