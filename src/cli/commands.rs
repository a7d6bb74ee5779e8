use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::browser::session::{SessionOptions, WebDriverSession};
use crate::cli::config::{build_fixture, build_session_options, build_wait_config, AppConfig, Cli};
use crate::error::{E2eError, E2eResult};
use crate::report::console::format_console_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::SuiteReport;
use crate::scenario::catalog::Scenario;
use crate::scenario::fixture::Fixture;
use crate::scenario::runner::{ScenarioRunner, WebDriverFactory};
use crate::trace::logger::TraceLogger;

const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// run subcommand
// ============================================================================

/// Options of the `run` subcommand after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub scenarios: Vec<Scenario>,
    pub format: String,
    pub output: Option<String>,
    pub trace: Option<String>,
    pub preflight: bool,
}

impl RunOptions {
    pub fn resolve(
        scenario_names: &[String],
        format: Option<String>,
        output: Option<String>,
        trace: Option<String>,
        config: &AppConfig,
    ) -> E2eResult<Self> {
        let names = if scenario_names.is_empty() {
            config.run.scenarios.as_slice()
        } else {
            scenario_names
        };
        let scenarios = if names.is_empty() {
            Scenario::ALL.to_vec()
        } else {
            names
                .iter()
                .map(|n| Scenario::from_name(n))
                .collect::<E2eResult<Vec<_>>>()?
        };

        let format = format.unwrap_or_else(|| config.run.format.clone());
        if format != "console" && format != "junit" {
            return Err(E2eError::Config(format!(
                "unknown output format '{}' (expected console or junit)",
                format
            )));
        }

        Ok(Self {
            scenarios,
            format,
            output: output.or_else(|| config.run.output.clone()),
            trace: trace.or_else(|| config.run.trace.clone()),
            preflight: config.run.preflight,
        })
    }
}

/// Run scenarios and return whether all passed.
pub fn cmd_run(cli: &Cli, config: &AppConfig, options: &RunOptions) -> E2eResult<bool> {
    let session_options = build_session_options(cli, config);
    let fixture = build_fixture(cli, config);
    let waits = build_wait_config(config);

    if options.preflight {
        preflight(&fixture, &session_options)?;
    }

    let tracer = match &options.trace {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    info!(count = options.scenarios.len(), base_url = %fixture.base_url, "running scenarios");

    let factory = WebDriverFactory {
        options: session_options,
    };
    let runner = ScenarioRunner::new(&factory, &fixture, waits).with_tracer(&tracer);

    let start = Instant::now();
    let results = runner.run_all(&options.scenarios);
    let duration = start.elapsed().as_millis();

    let report = SuiteReport::from_results("marketplace", results).with_duration(duration);
    let all_passed = report.all_passed();

    let output_content = match options.format.as_str() {
        "junit" => generate_junit_xml(&report),
        _ => format_console_report(&report),
    };

    match &options.output {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

/// Fail fast when the application or the WebDriver server is not answering.
pub fn preflight(fixture: &Fixture, session: &SessionOptions) -> E2eResult<()> {
    let client = Client::builder().timeout(PREFLIGHT_TIMEOUT).build()?;
    match client.get(&fixture.base_url).send() {
        Ok(response) => debug!(status = %response.status(), "application reachable"),
        Err(e) => {
            return Err(E2eError::Unreachable {
                what: "application".into(),
                url: fixture.base_url.clone(),
                reason: e.to_string(),
            });
        }
    }

    let status = WebDriverSession::status(&session.webdriver_url, PREFLIGHT_TIMEOUT).map_err(|e| {
        E2eError::Unreachable {
            what: "webdriver".into(),
            url: session.webdriver_url.clone(),
            reason: e.to_string(),
        }
    })?;
    if !status.ready {
        return Err(E2eError::Unreachable {
            what: "webdriver".into(),
            url: session.webdriver_url.clone(),
            reason: format!("not ready: {}", status.message),
        });
    }
    debug!("webdriver ready");
    Ok(())
}

// ============================================================================
// list subcommand
// ============================================================================

pub fn format_scenario_list() -> String {
    let mut out = String::new();
    for scenario in Scenario::ALL {
        out.push_str(&format!(
            "{:<18} {:<7} {:<13} {}\n",
            scenario.name(),
            scenario.account().to_string(),
            scenario.target_route(),
            scenario.description()
        ));
    }
    out
}

pub fn cmd_list() {
    print!("{}", format_scenario_list());
}
