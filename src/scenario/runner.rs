use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::browser::driver::Browser;
use crate::browser::session::{SessionOptions, WebDriverSession};
use crate::error::{E2eResult, FailureCategory};
use crate::scenario::catalog::Scenario;
use crate::scenario::context::{CheckResult, CheckStatus, ScenarioContext, WaitConfig};
use crate::scenario::fixture::{Account, Fixture};
use crate::trace::logger::TraceLogger;

/// Opens a fresh, exclusive browser session per scenario.
pub trait SessionFactory {
    fn open(&self) -> E2eResult<Box<dyn Browser>>;
}

/// Sessions on a WebDriver server.
pub struct WebDriverFactory {
    pub options: SessionOptions,
}

impl SessionFactory for WebDriverFactory {
    fn open(&self) -> E2eResult<Box<dyn Browser>> {
        Ok(Box::new(WebDriverSession::launch(&self.options)?))
    }
}

/// Owns a session for the length of one scenario and ends it on every exit
/// path, including unwinding.
pub struct SessionGuard {
    browser: Box<dyn Browser>,
    released: bool,
}

impl SessionGuard {
    pub fn new(browser: Box<dyn Browser>) -> Self {
        Self {
            browser,
            released: false,
        }
    }

    pub fn browser(&mut self) -> &mut dyn Browser {
        self.browser.as_mut()
    }

    /// Quit the session now. Failures are logged; the scenario verdict stands.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.browser.quit() {
            warn!(error = %e, "failed to quit browser session");
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Result of running one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub passed: bool,
    pub steps_run: usize,
    pub checks: Vec<CheckResult>,
    pub error: Option<String>,
    pub failure: Option<FailureCategory>,
    pub duration_ms: u128,
}

impl ScenarioResult {
    /// Checks that passed only through a fallback criterion.
    pub fn fallback_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::PassedViaFallback)
            .count()
    }
}

/// Runs scenarios one after another, each in its own session.
pub struct ScenarioRunner<'a> {
    factory: &'a dyn SessionFactory,
    fixture: &'a Fixture,
    waits: WaitConfig,
    tracer: Option<&'a TraceLogger>,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(factory: &'a dyn SessionFactory, fixture: &'a Fixture, waits: WaitConfig) -> Self {
        Self {
            factory,
            fixture,
            waits,
            tracer: None,
        }
    }

    pub fn with_tracer(mut self, tracer: &'a TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Run a single scenario.
    ///
    /// After the journey succeeds, the browser must be on the scenario's
    /// target route; that verdict is never retried.
    pub fn run(&self, scenario: Scenario) -> ScenarioResult {
        let start = Instant::now();
        info!(scenario = %scenario, account = %scenario.account(), "starting scenario");

        let browser = match self.factory.open() {
            Ok(browser) => browser,
            Err(e) => {
                error!(scenario = %scenario, error = %e, "could not open browser session");
                return ScenarioResult {
                    scenario: scenario.name().to_string(),
                    passed: false,
                    steps_run: 0,
                    checks: Vec::new(),
                    error: Some(format!("Failed to open session: {}", e)),
                    failure: Some(e.category()),
                    duration_ms: start.elapsed().as_millis(),
                };
            }
        };
        let mut guard = SessionGuard::new(browser);

        let (outcome, steps_run, checks) = {
            let mut ctx = ScenarioContext::new(scenario.name(), guard.browser(), self.waits, self.fixture);
            if let Some(tracer) = self.tracer {
                ctx = ctx.with_tracer(tracer);
            }
            let outcome = scenario
                .execute(&mut ctx)
                .and_then(|()| Self::verify_route(&mut ctx, scenario));
            (outcome, ctx.steps_run(), ctx.into_checks())
        };
        guard.release();

        let duration_ms = start.elapsed().as_millis();
        match outcome {
            Ok(()) => {
                info!(scenario = %scenario, duration_ms, "scenario passed");
                ScenarioResult {
                    scenario: scenario.name().to_string(),
                    passed: true,
                    steps_run,
                    checks,
                    error: None,
                    failure: None,
                    duration_ms,
                }
            }
            Err(e) => {
                error!(scenario = %scenario, category = %e.category(), error = %e, "scenario failed");
                ScenarioResult {
                    scenario: scenario.name().to_string(),
                    passed: false,
                    steps_run,
                    checks,
                    error: Some(format!("Step {} failed: {}", steps_run, e)),
                    failure: Some(e.category()),
                    duration_ms,
                }
            }
        }
    }

    /// Run scenarios sequentially; one failure never stops the others.
    pub fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        note_shared_accounts(scenarios);
        scenarios.iter().map(|s| self.run(*s)).collect()
    }

    fn verify_route(ctx: &mut ScenarioContext<'_>, scenario: Scenario) -> E2eResult<()> {
        let url = ctx.current_url()?;
        let target = scenario.target_route();
        ctx.ensure("final route", url.contains(target), || {
            format!("expected location containing '{}', got {}", target, url)
        })
    }
}

fn note_shared_accounts(scenarios: &[Scenario]) {
    let mut by_account: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
    for scenario in scenarios {
        let key = match scenario.account() {
            Account::Buyer => "buyer",
            Account::Seller => "seller",
            Account::Anonymous => continue,
        };
        by_account.entry(key).or_default().push(scenario.name());
    }
    for (account, names) in by_account {
        if names.len() > 1 {
            info!(
                account,
                scenarios = %names.join(", "),
                "scenarios share one account; do not run another suite against it concurrently"
            );
        }
    }
}
