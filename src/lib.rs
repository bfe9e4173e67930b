//! End-to-end verification of the Hudl login journey.
//!
//! Scenarios drive a real browser through in-app navigation and the
//! identity provider's hosted login form, then check what the page shows
//! at each step. The browser itself sits behind [`browser::driver::PageDriver`].

pub mod assertion;
pub mod browser;
pub mod cli;
pub mod error;
pub mod fixtures;
pub mod flow;
pub mod report;
pub mod scenario;
pub mod selectors;
pub mod trace;
