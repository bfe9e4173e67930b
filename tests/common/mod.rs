#![allow(dead_code)]

pub mod fake_site;

use std::time::Duration;

use hudl_login_e2e::assertion::wait::WaitOptions;
use hudl_login_e2e::fixtures::catalog::{DEFAULT_EMAIL_VAR, DEFAULT_PASSWORD_VAR, TestDataCatalog};
use hudl_login_e2e::scenario::runner::RunSettings;

use fake_site::{REGISTERED_EMAIL, REGISTERED_PASSWORD};

/// Catalog holding the fake site's registered account.
pub fn catalog() -> TestDataCatalog {
    TestDataCatalog::from_lookup(DEFAULT_EMAIL_VAR, DEFAULT_PASSWORD_VAR, |name| {
        match name {
            DEFAULT_EMAIL_VAR => Some(REGISTERED_EMAIL.to_string()),
            DEFAULT_PASSWORD_VAR => Some(REGISTERED_PASSWORD.to_string()),
            _ => None,
        }
    })
}

/// Catalog with no real account configured.
pub fn catalog_without_credentials() -> TestDataCatalog {
    TestDataCatalog::from_lookup(DEFAULT_EMAIL_VAR, DEFAULT_PASSWORD_VAR, |_| None)
}

/// Run settings with short waits so failing expectations time out quickly.
pub fn fast_settings() -> RunSettings {
    RunSettings {
        action_timeout: Duration::from_millis(50),
        navigation_timeout: Duration::from_millis(75),
        wait: fast_wait(),
        ..RunSettings::default()
    }
}

pub fn fast_wait() -> WaitOptions {
    WaitOptions::new(Duration::from_millis(20), Duration::from_millis(5))
}
