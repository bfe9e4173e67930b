use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assertion::wait::{DEFAULT_EXPECT_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, WaitOptions};
use crate::browser::engine::BrowserEngine;
use crate::browser::session::DEFAULT_DRIVER_SCRIPT;
use crate::fixtures::catalog::{DEFAULT_EMAIL_VAR, DEFAULT_PASSWORD_VAR};
use crate::flow::actions::{DEFAULT_LOGIN_URL, DEFAULT_NAVIGATION_TIMEOUT_MS};
use crate::scenario::runner::{DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_BASE_URL, RunSettings};
use crate::selectors::registry::SelectorRegistry;

pub const DEFAULT_CONFIG_PATH: &str = "hudl-login.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "hudl-login-e2e",
    version,
    about = "End-to-end checks for the Hudl login journey"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: hudl-login.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scenario matrix against real browsers
    Run(RunArgs),

    /// Print the expanded scenario cases without running them
    List(SelectArgs),
}

/// Which cases to expand.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Browser engine to run (repeatable): chromium, firefox, webkit
    #[arg(long = "engine")]
    pub engines: Vec<BrowserEngine>,

    /// Only per-viewport cases for this viewport name (repeatable)
    #[arg(long = "viewport")]
    pub viewports: Vec<String>,

    /// Only cases whose title contains this text
    #[arg(long)]
    pub grep: Option<String>,

    /// Scenario YAML file or directory replacing the built-in matrix
    #[arg(long)]
    pub scenarios: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Output format: console, html, junit
    #[arg(long)]
    pub format: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Number of cases to run in parallel
    #[arg(long)]
    pub workers: Option<usize>,

    /// Append a JSONL step trace to this file
    #[arg(long)]
    pub trace: Option<String>,

    /// Application base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Identity-provider login-identifier URL
    #[arg(long)]
    pub login_url: Option<String>,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `hudl-login.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub selectors: SelectorRegistry,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_login_url")]
    pub login_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_url: default_login_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_engines")]
    pub engines: Vec<BrowserEngine>,

    /// Node.js Playwright driver speaking the NDJSON session protocol
    #[serde(default = "default_driver_script")]
    pub driver_script: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engines: default_engines(),
            driver_script: default_driver_script(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_action_ms")]
    pub action_ms: u64,

    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: u64,

    #[serde(default = "default_expect_ms")]
    pub expect_ms: u64,

    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            action_ms: DEFAULT_ACTION_TIMEOUT_MS,
            navigation_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
            expect_ms: DEFAULT_EXPECT_TIMEOUT_MS,
            poll_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Names of the environment variables holding the real account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_email_var")]
    pub email_var: String,

    #[serde(default = "default_password_var")]
    pub password_var: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            email_var: default_email_var(),
            password_var: default_password_var(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,

    #[serde(default = "default_one")]
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: "console".to_string(),
            output: None,
            workers: 1,
        }
    }
}

// Serde default helpers
fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_login_url() -> String { DEFAULT_LOGIN_URL.to_string() }
fn default_engines() -> Vec<BrowserEngine> { vec![BrowserEngine::Chromium, BrowserEngine::Webkit] }
fn default_driver_script() -> String { DEFAULT_DRIVER_SCRIPT.to_string() }
fn default_action_ms() -> u64 { DEFAULT_ACTION_TIMEOUT_MS }
fn default_navigation_ms() -> u64 { DEFAULT_NAVIGATION_TIMEOUT_MS }
fn default_expect_ms() -> u64 { DEFAULT_EXPECT_TIMEOUT_MS }
fn default_poll_ms() -> u64 { DEFAULT_POLL_INTERVAL_MS }
fn default_email_var() -> String { DEFAULT_EMAIL_VAR.to_string() }
fn default_password_var() -> String { DEFAULT_PASSWORD_VAR.to_string() }
fn default_console() -> String { "console".to_string() }
fn default_one() -> usize { 1 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

impl AppConfig {
    /// Engines to run: CLI list if given, else the config file's.
    pub fn resolve_engines(&self, cli_engines: &[BrowserEngine]) -> Vec<BrowserEngine> {
        if cli_engines.is_empty() {
            self.browser.engines.clone()
        } else {
            cli_engines.to_vec()
        }
    }

    /// Build the per-run targets and timeouts, CLI overrides first.
    pub fn run_settings(&self, base_url: Option<&str>, login_url: Option<&str>) -> RunSettings {
        RunSettings {
            base_url: base_url.unwrap_or(&self.target.base_url).to_string(),
            login_url: login_url.unwrap_or(&self.target.login_url).to_string(),
            action_timeout: Duration::from_millis(self.timeouts.action_ms),
            navigation_timeout: Duration::from_millis(self.timeouts.navigation_ms),
            wait: WaitOptions::new(
                Duration::from_millis(self.timeouts.expect_ms),
                Duration::from_millis(self.timeouts.poll_ms),
            ),
        }
    }
}
