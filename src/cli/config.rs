use std::path::Path;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::session::{BrowserKind, SessionOptions};
use crate::error::{E2eError, E2eResult};
use crate::scenario::context::WaitConfig;
use crate::scenario::fixture::Fixture;

pub const DEFAULT_CONFIG_FILE: &str = "marketplace-e2e.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "marketplace-e2e",
    version,
    about = "Browser end-to-end suite for the marketplace web app"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: marketplace-e2e.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// WebDriver server endpoint
    #[arg(long, global = true)]
    pub webdriver_url: Option<String>,

    /// Root URL of the application under test
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Browser the WebDriver server should start
    #[arg(long, value_enum, global = true)]
    pub browser: Option<BrowserKind>,

    /// Run the browser without a window
    #[arg(long, global = true)]
    pub headless: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the application
    Run {
        /// Scenario to run; repeat for several (default: all)
        #[arg(short, long = "scenario")]
        scenarios: Vec<String>,

        /// Output format: console, junit
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Append a JSONL step trace to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// List known scenarios
    List,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `marketplace-e2e.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub webdriver: WebDriverConfig,
    #[serde(default)]
    pub waits: WaitsConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub fixture: Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    #[serde(default = "default_browser")]
    pub browser: BrowserKind,

    #[serde(default)]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            browser: default_browser(),
            headless: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Timeouts in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitsConfig {
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    #[serde(default = "default_candidate_timeout_ms")]
    pub candidate_timeout_ms: u64,

    #[serde(default = "default_toast_timeout_ms")]
    pub toast_timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for WaitsConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            candidate_timeout_ms: default_candidate_timeout_ms(),
            toast_timeout_ms: default_toast_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,

    pub trace: Option<String>,

    /// Scenarios run when none are named on the command line (empty: all)
    #[serde(default)]
    pub scenarios: Vec<String>,

    /// Check that the app and WebDriver answer before starting
    #[serde(default = "default_true")]
    pub preflight: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
            trace: None,
            scenarios: Vec::new(),
            preflight: true,
        }
    }
}

// Serde default helpers
fn default_webdriver_url() -> String { "http://localhost:4444".to_string() }
fn default_browser() -> BrowserKind { BrowserKind::Firefox }
fn default_window_width() -> u32 { 1280 }
fn default_window_height() -> u32 { 900 }
fn default_request_timeout_secs() -> u64 { 60 }
fn default_timeout_ms() -> u64 { 15_000 }
fn default_candidate_timeout_ms() -> u64 { 5_000 }
fn default_toast_timeout_ms() -> u64 { 6_000 }
fn default_poll_interval_ms() -> u64 { 500 }
fn default_settle_delay_ms() -> u64 { 1_000 }
fn default_true() -> bool { true }
fn default_console() -> String { "console".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file.
///
/// A missing default file yields defaults; an explicitly named file must
/// exist. A file that does not parse is an error.
pub fn load_config(path: Option<&str>) -> E2eResult<AppConfig> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    if !Path::new(config_path).exists() {
        if path.is_some() {
            return Err(E2eError::Config(format!("config file '{}' not found", config_path)));
        }
        debug!(path = config_path, "no config file; using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(config_path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    pub fn validate(&self) -> E2eResult<()> {
        if self.waits.poll_interval_ms == 0 {
            return Err(E2eError::Config("waits.poll_interval_ms must be positive".into()));
        }
        if !self.fixture.registration.email_template.contains("{ts}") {
            return Err(E2eError::Config(
                "fixture.registration.email_template must contain {ts}".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

pub fn build_session_options(cli: &Cli, config: &AppConfig) -> SessionOptions {
    let wd = &config.webdriver;
    SessionOptions {
        webdriver_url: cli.webdriver_url.clone().unwrap_or_else(|| wd.url.clone()),
        browser: cli.browser.unwrap_or(wd.browser),
        headless: cli.headless || wd.headless,
        window_width: wd.window_width,
        window_height: wd.window_height,
        request_timeout: Duration::from_secs(wd.request_timeout_secs),
    }
}

pub fn build_wait_config(config: &AppConfig) -> WaitConfig {
    let w = &config.waits;
    WaitConfig {
        default_timeout: Duration::from_millis(w.default_timeout_ms),
        candidate_timeout: Duration::from_millis(w.candidate_timeout_ms),
        toast_timeout: Duration::from_millis(w.toast_timeout_ms),
        poll_interval: Duration::from_millis(w.poll_interval_ms),
        settle_delay: Duration::from_millis(w.settle_delay_ms),
    }
}

pub fn build_fixture(cli: &Cli, config: &AppConfig) -> Fixture {
    let mut fixture = config.fixture.clone();
    if let Some(base_url) = &cli.base_url {
        fixture.base_url = base_url.clone();
    }
    fixture
}
