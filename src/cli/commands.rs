use std::path::Path;

use tracing::{debug, info, warn};

use crate::browser::session::NodeSessionFactory;
use crate::browser::viewport::ViewportConfig;
use crate::cli::config::{AppConfig, RunArgs, SelectArgs};
use crate::error::HarnessError;
use crate::fixtures::catalog::{CredentialKind, TestDataCatalog};
use crate::report::console::format_console_report;
use crate::report::html::generate_html_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::TestSuiteReport;
use crate::scenario::matrix::{CaseFilter, ScenarioMatrix};
use crate::scenario::runner::ScenarioRunner;
use crate::scenario::scenario_model::Scenario;
use crate::trace::logger::TraceLogger;

pub const SUITE_NAME: &str = "Hudl login";

// ============================================================================
// run subcommand
// ============================================================================

/// Run the selected cases and return whether all passed.
pub fn cmd_run(args: &RunArgs, config: &AppConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let matrix = build_matrix(args.select.scenarios.as_deref())?;
    let engines = config.resolve_engines(&args.select.engines);
    let cases = matrix.filtered_cases(&engines, &case_filter(&args.select));

    if cases.is_empty() {
        warn!("no scenario cases selected");
        return Ok(true);
    }

    let catalog =
        TestDataCatalog::from_env(&config.credentials.email_var, &config.credentials.password_var);
    // Only the cases that need the real account will fail
    if let Err(e) = catalog.fixture(CredentialKind::Valid) {
        warn!("{}; cases using the registered account will fail", e);
    }

    let settings = config.run_settings(args.base_url.as_deref(), args.login_url.as_deref());
    let tracer = match args.trace.as_deref() {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    let factory = NodeSessionFactory::new(&config.browser.driver_script);
    let workers = args.workers.unwrap_or(config.run.workers);

    info!(cases = cases.len(), workers, "running scenario matrix");
    let runner = ScenarioRunner::new(&config.selectors, &catalog, &settings, &tracer);
    let start = std::time::Instant::now();
    let results = runner.run_cases(&cases, &factory, workers);
    let duration = start.elapsed().as_millis();

    let report = TestSuiteReport::from_results(SUITE_NAME, results).with_duration(duration);
    let all_passed = report.all_passed();

    let format = args.format.as_deref().unwrap_or(&config.run.format);
    let output_content = match format {
        "html" => generate_html_report(&report),
        "junit" => generate_junit_xml(&report),
        _ => format_console_report(&report),
    };

    match args.output.as_deref().or(config.run.output.as_deref()) {
        Some(path) => {
            std::fs::write(path, &output_content)?;
            debug!(path, "report written");
        }
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

// ============================================================================
// list subcommand
// ============================================================================

/// Print the expanded case titles, one per line.
pub fn cmd_list(args: &SelectArgs, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let matrix = build_matrix(args.scenarios.as_deref())?;
    let engines = config.resolve_engines(&args.engines);
    let cases = matrix.filtered_cases(&engines, &case_filter(args));
    for case in &cases {
        println!("{}", case.title());
    }
    println!("{} cases", cases.len());
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn case_filter(args: &SelectArgs) -> CaseFilter {
    CaseFilter {
        viewports: args.viewports.clone(),
        grep: args.grep.clone(),
    }
}

/// Built-in matrix, or the scenarios loaded from `path` over the preset
/// viewports.
pub fn build_matrix(path: Option<&str>) -> Result<ScenarioMatrix, HarnessError> {
    match path {
        Some(p) => Ok(ScenarioMatrix::new(
            load_scenarios(p)?,
            ViewportConfig::presets(),
        )),
        None => Ok(ScenarioMatrix::hudl_login()),
    }
}

/// Load scenarios from a single YAML file or a directory of YAML files.
///
/// A file holds either one scenario or a list of them. Directory entries
/// are read in file-name order; scenarios keep their order within a file.
pub fn load_scenarios(path: &str) -> Result<Vec<Scenario>, HarnessError> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_dir() {
        return load_scenario_file(Path::new(path));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let p = entry?.path();
        if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            files.push(p);
        }
    }
    files.sort();

    let mut scenarios = Vec::new();
    for file in files {
        scenarios.extend(load_scenario_file(&file)?);
    }
    Ok(scenarios)
}

fn load_scenario_file(path: &Path) -> Result<Vec<Scenario>, HarnessError> {
    let content = std::fs::read_to_string(path)?;
    match serde_yaml::from_str::<Vec<Scenario>>(&content) {
        Ok(list) => Ok(list),
        Err(_) => Ok(vec![serde_yaml::from_str::<Scenario>(&content)?]),
    }
}
