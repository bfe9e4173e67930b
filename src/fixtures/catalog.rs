use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

pub const DEFAULT_EMAIL_VAR: &str = "HUDL_EMAIL";
pub const DEFAULT_PASSWORD_VAR: &str = "HUDL_PASSWORD";

pub const INVALID_EMAIL: &str = "unregistered_email_address";
pub const VALID_UNREGISTERED_EMAIL: &str = "valid_unregistered_email_address@gmail.com";
pub const GENERIC_EMAIL: &str = "valid_email_address@gmail.com";
pub const INVALID_PASSWORD: &str = "invalid_password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// A real, registered account supplied by the environment
    Valid,
    /// Not shaped like an email at all
    Invalid,
    /// Email-shaped but has no account behind it
    UnregisteredValidFormat,
    /// Email-shaped placeholder used where registration does not matter
    Generic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CredentialFixture {
    pub kind: CredentialKind,
    pub email: String,
    pub password: String,
}

/// Names an input value without embedding it, so scenarios stay pure data
/// and env-sourced secrets are only read when a step needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureRef {
    ValidEmail,
    ValidPassword,
    InvalidEmail,
    ValidUnregisteredEmail,
    GenericEmail,
    InvalidPassword,
    Empty,
}

impl FixtureRef {
    /// Credential family this input belongs to.
    pub fn kind(&self) -> CredentialKind {
        match self {
            FixtureRef::ValidEmail | FixtureRef::ValidPassword => CredentialKind::Valid,
            FixtureRef::InvalidEmail | FixtureRef::InvalidPassword | FixtureRef::Empty => {
                CredentialKind::Invalid
            }
            FixtureRef::ValidUnregisteredEmail => CredentialKind::UnregisteredValidFormat,
            FixtureRef::GenericEmail => CredentialKind::Generic,
        }
    }
}

/// Read-only input fixtures, constructed once at start-up.
#[derive(Debug, Clone)]
pub struct TestDataCatalog {
    email_var: String,
    password_var: String,
    valid_email: Option<String>,
    valid_password: Option<String>,
}

impl TestDataCatalog {
    /// Capture the valid account from the process environment.
    pub fn from_env(email_var: &str, password_var: &str) -> Self {
        Self::from_lookup(email_var, password_var, |name| std::env::var(name).ok())
    }

    /// Capture the valid account through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(email_var: &str, password_var: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            email_var: email_var.to_string(),
            password_var: password_var.to_string(),
            valid_email: read(email_var),
            valid_password: read(password_var),
        }
    }

    /// Resolve a fixture reference to the literal to type.
    ///
    /// Fails only for env-sourced values that are unset.
    pub fn resolve(&self, fixture: FixtureRef) -> Result<String, HarnessError> {
        match fixture {
            FixtureRef::ValidEmail => Self::required(&self.valid_email, &self.email_var),
            FixtureRef::ValidPassword => Self::required(&self.valid_password, &self.password_var),
            FixtureRef::InvalidEmail => Ok(INVALID_EMAIL.into()),
            FixtureRef::ValidUnregisteredEmail => Ok(VALID_UNREGISTERED_EMAIL.into()),
            FixtureRef::GenericEmail => Ok(GENERIC_EMAIL.into()),
            FixtureRef::InvalidPassword => Ok(INVALID_PASSWORD.into()),
            FixtureRef::Empty => Ok(String::new()),
        }
    }

    /// The full fixture for a credential family.
    pub fn fixture(&self, kind: CredentialKind) -> Result<CredentialFixture, HarnessError> {
        let (email, password) = match kind {
            CredentialKind::Valid => (FixtureRef::ValidEmail, FixtureRef::ValidPassword),
            CredentialKind::Invalid => (FixtureRef::InvalidEmail, FixtureRef::InvalidPassword),
            CredentialKind::UnregisteredValidFormat => {
                (FixtureRef::ValidUnregisteredEmail, FixtureRef::InvalidPassword)
            }
            CredentialKind::Generic => (FixtureRef::GenericEmail, FixtureRef::InvalidPassword),
        };
        Ok(CredentialFixture {
            kind,
            email: self.resolve(email)?,
            password: self.resolve(password)?,
        })
    }

    fn required(value: &Option<String>, var: &str) -> Result<String, HarnessError> {
        value.clone().ok_or_else(|| HarnessError::MissingCredential {
            var: var.to_string(),
        })
    }
}
