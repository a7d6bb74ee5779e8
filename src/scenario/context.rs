use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::browser::driver::Browser;
use crate::browser::protocol::{ElementRef, Locator};
use crate::error::{E2eError, E2eResult};
use crate::interact::executor::{self, Action, ActionMode};
use crate::interact::poller::{Condition, Expectation, Outcome, OutcomeCheck, Requirement};
use crate::interact::resolver::{self, Actionability, CandidateList, Resolved};
use crate::scenario::fixture::Fixture;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{TraceEvent, TraceKind};

/// Timing knobs shared by every primitive in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitConfig {
    /// Explicit-wait timeout for elements and conditions
    pub default_timeout: Duration,
    /// Timeout for candidates in a list that has no per-candidate override
    pub candidate_timeout: Duration,
    /// How long a confirmation toast may take to appear
    pub toast_timeout: Duration,
    pub poll_interval: Duration,
    /// Pause after actions whose effects the UI applies asynchronously
    pub settle_delay: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(15),
            candidate_timeout: Duration::from_secs(5),
            toast_timeout: Duration::from_secs(6),
            poll_interval: crate::interact::poller::DEFAULT_POLL_INTERVAL,
            settle_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    /// The primary criterion timed out and a weaker one was accepted
    PassedViaFallback,
    /// An optional outcome did not show up
    NotObserved,
    Failed,
}

impl CheckStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Failed)
    }
}

/// One verification performed by a scenario, kept for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub step_index: usize,
    pub check: String,
    pub status: CheckStatus,
    pub detail: Option<String>,
}

/// Everything a scenario script works with: its exclusive browser session,
/// the wait configuration, the fixture, and the log of checks performed.
pub struct ScenarioContext<'a> {
    browser: &'a mut dyn Browser,
    pub waits: WaitConfig,
    pub fixture: &'a Fixture,
    scenario: String,
    current_step: usize,
    checks: Vec<CheckResult>,
    tracer: Option<&'a TraceLogger>,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(
        scenario: impl Into<String>,
        browser: &'a mut dyn Browser,
        waits: WaitConfig,
        fixture: &'a Fixture,
    ) -> Self {
        Self {
            browser,
            waits,
            fixture,
            scenario: scenario.into(),
            current_step: 0,
            checks: Vec::new(),
            tracer: None,
        }
    }

    pub fn with_tracer(mut self, tracer: &'a TraceLogger) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn browser(&mut self) -> &mut dyn Browser {
        &mut *self.browser
    }

    /// Number of steps started so far.
    pub fn steps_run(&self) -> usize {
        self.current_step
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn into_checks(self) -> Vec<CheckResult> {
        self.checks
    }

    fn trace(&self, kind: TraceKind, subject: impl ToString) -> Option<TraceEvent> {
        self.tracer
            .filter(|t| t.is_enabled())
            .map(|_| TraceEvent::now(&self.scenario, self.current_step, kind, subject))
    }

    fn emit(&self, event: Option<TraceEvent>) {
        if let (Some(tracer), Some(event)) = (self.tracer, event) {
            tracer.log(&event);
        }
    }

    fn record(&mut self, check: impl Into<String>, status: CheckStatus, detail: Option<String>) {
        self.checks.push(CheckResult {
            step_index: self.current_step,
            check: check.into(),
            status,
            detail,
        });
    }

    // ------------------------------------------------------------------------
    // Steps and navigation
    // ------------------------------------------------------------------------

    /// Start the next named step.
    pub fn step(&mut self, name: &str) {
        self.current_step += 1;
        info!(scenario = %self.scenario, step = self.current_step, "{}", name);
        let event = self.trace(TraceKind::Step, name);
        self.emit(event);
    }

    /// Navigate to an application route, e.g. `/products`.
    pub fn open(&mut self, route: &str) -> E2eResult<()> {
        let url = self.fixture.url(route);
        let event = self.trace(TraceKind::Navigate, &url);
        self.browser.navigate(&url)?;
        self.emit(event);
        Ok(())
    }

    pub fn current_url(&mut self) -> E2eResult<String> {
        self.browser.current_url()
    }

    pub fn count(&mut self, locator: &Locator) -> E2eResult<usize> {
        self.browser.count(locator)
    }

    pub fn settle(&self) {
        self.pause(self.waits.settle_delay);
    }

    pub fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    pub fn resolve(&mut self, candidates: &CandidateList, actionability: Actionability) -> E2eResult<ElementRef> {
        Ok(self.resolve_detailed(candidates, actionability)?.element)
    }

    /// Resolve and also report which candidate won.
    pub fn resolve_detailed(
        &mut self,
        candidates: &CandidateList,
        actionability: Actionability,
    ) -> E2eResult<Resolved> {
        let timeout = self.candidate_timeout_for(candidates);
        let event = self.trace(TraceKind::Resolve, &candidates.target);
        let start = Instant::now();
        let result = resolver::resolve(
            &mut *self.browser,
            candidates,
            actionability,
            timeout,
            self.waits.poll_interval,
        );
        self.emit(event.map(|e| trace_result(e, &result, start)));
        result
    }

    pub fn resolve_within(
        &mut self,
        parent: &ElementRef,
        candidates: &CandidateList,
        actionability: Actionability,
    ) -> E2eResult<ElementRef> {
        let timeout = self.candidate_timeout_for(candidates);
        let event = self.trace(TraceKind::Resolve, &candidates.target);
        let start = Instant::now();
        let result = resolver::resolve_within(
            &mut *self.browser,
            parent,
            candidates,
            actionability,
            timeout,
            self.waits.poll_interval,
        );
        self.emit(event.map(|e| trace_result(e, &result, start)));
        Ok(result?.element)
    }

    /// Resolve a single locator with the default timeout.
    pub fn find(&mut self, target: &str, locator: Locator, actionability: Actionability) -> E2eResult<ElementRef> {
        self.resolve(&CandidateList::single(target, locator), actionability)
    }

    // A lone locator is an explicit wait on one element and gets the full
    // default timeout; alternatives share the shorter candidate timeout.
    fn candidate_timeout_for(&self, candidates: &CandidateList) -> Duration {
        if candidates.len() > 1 {
            self.waits.candidate_timeout
        } else {
            self.waits.default_timeout
        }
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    pub fn act(&mut self, element: &ElementRef, action: Action, mode: ActionMode) -> E2eResult<()> {
        let event = self.trace(TraceKind::Act, element);
        let start = Instant::now();
        let result = executor::perform(&mut *self.browser, element, &action, mode);
        self.emit(event.map(|e| {
            trace_result(e, &result, start).with_detail(format!("{} ({:?})", action.name(), mode))
        }));
        result
    }

    /// Standard first, forced when the browser refuses.
    pub fn act_with_fallback(&mut self, element: &ElementRef, action: Action) -> E2eResult<ActionMode> {
        let event = self.trace(TraceKind::Act, element);
        let start = Instant::now();
        let result = executor::perform_with_fallback(&mut *self.browser, element, &action);
        self.emit(event.map(|e| {
            let e = trace_result(e, &result, start);
            match &result {
                Ok(mode) => e.with_detail(format!("{} ({:?})", action.name(), mode)),
                Err(_) => e.with_detail(action.name()),
            }
        }));
        result
    }

    pub fn click(&mut self, element: &ElementRef) -> E2eResult<ActionMode> {
        self.act_with_fallback(element, Action::Click)
    }

    pub fn force_click(&mut self, element: &ElementRef) -> E2eResult<()> {
        self.act(element, Action::Click, ActionMode::Forced)
    }

    /// Resolve a visible field and clear-and-type into it.
    pub fn fill(&mut self, target: &str, locator: Locator, text: &str) -> E2eResult<ElementRef> {
        let element = self.find(target, locator, Actionability::Visible)?;
        self.act_with_fallback(&element, Action::ClearAndType(text.to_string()))?;
        Ok(element)
    }

    // ------------------------------------------------------------------------
    // Waiting and verification
    // ------------------------------------------------------------------------

    pub fn wait_for(&mut self, condition: Condition) -> E2eResult<Duration> {
        let timeout = self.waits.default_timeout;
        self.wait_for_within(condition, timeout)
    }

    pub fn wait_for_within(&mut self, condition: Condition, timeout: Duration) -> E2eResult<Duration> {
        let event = self.trace(TraceKind::Poll, &condition);
        let start = Instant::now();
        let result = Expectation::new(condition, timeout).wait(&mut *self.browser, self.waits.poll_interval);
        self.emit(event.map(|e| trace_result(e, &result, start)));
        result
    }

    /// Verify a tiered outcome and record how it was satisfied.
    pub fn verify(&mut self, check: &OutcomeCheck) -> E2eResult<Outcome> {
        let event = self.trace(TraceKind::Check, &check.name);
        let start = Instant::now();
        let result = check.verify(&mut *self.browser, self.waits.poll_interval);

        match &result {
            Ok(Outcome::Primary) => self.record(&check.name, CheckStatus::Passed, None),
            Ok(Outcome::Fallback { condition, .. }) => self.record(
                &check.name,
                CheckStatus::PassedViaFallback,
                Some(format!("accepted: {}", condition)),
            ),
            Err(e) => self.record(&check.name, CheckStatus::Failed, Some(e.to_string())),
        }
        self.emit(event.map(|e| trace_result(e, &result, start)));
        result
    }

    /// Wait for an outcome that may or may not appear.
    ///
    /// With `Requirement::Optional` a timeout is recorded as `NotObserved` and
    /// the scenario continues; returns whether the outcome was seen.
    pub fn observe(&mut self, name: &str, expectation: Expectation, requirement: Requirement) -> E2eResult<bool> {
        let event = self.trace(TraceKind::Check, name);
        let start = Instant::now();
        let result = expectation.wait(&mut *self.browser, self.waits.poll_interval);

        let observed = match result {
            Ok(elapsed) => {
                self.record(name, CheckStatus::Passed, None);
                self.emit(event.map(|e| e.with_outcome("passed").with_elapsed(elapsed)));
                return Ok(true);
            }
            Err(E2eError::ConditionTimeout { condition, timeout }) => match requirement {
                Requirement::Optional => {
                    debug!(check = name, %condition, "optional outcome not observed");
                    self.record(name, CheckStatus::NotObserved, Some(condition));
                    false
                }
                Requirement::Required => {
                    let err = E2eError::ConditionTimeout { condition, timeout };
                    self.record(name, CheckStatus::Failed, Some(err.to_string()));
                    self.emit(event.map(|e| e.with_outcome("failed").with_elapsed(start.elapsed())));
                    return Err(err);
                }
            },
            Err(e) => {
                self.record(name, CheckStatus::Failed, Some(e.to_string()));
                return Err(e);
            }
        };
        self.emit(event.map(|e| e.with_outcome("not_observed").with_elapsed(start.elapsed())));
        Ok(observed)
    }

    /// Optional confirmation toast with the configured toast timeout.
    pub fn observe_toast(&mut self, name: &str, locator: Locator) -> E2eResult<bool> {
        let expectation = Expectation::new(Condition::Present(locator), self.waits.toast_timeout);
        self.observe(name, expectation, Requirement::Optional)
    }

    /// Record an assertion about observed state; a false `holds` fails the scenario.
    pub fn ensure(&mut self, name: &str, holds: bool, failure: impl FnOnce() -> String) -> E2eResult<()> {
        if holds {
            self.record(name, CheckStatus::Passed, None);
            Ok(())
        } else {
            let message = failure();
            self.record(name, CheckStatus::Failed, Some(message.clone()));
            Err(E2eError::Assertion(format!("{}: {}", name, message)))
        }
    }
}

fn trace_result<T>(event: TraceEvent, result: &E2eResult<T>, start: Instant) -> TraceEvent {
    let event = event.with_elapsed(start.elapsed());
    match result {
        Ok(_) => event.with_outcome("ok"),
        Err(e) => event.with_outcome(format!("error: {}", e)),
    }
}
