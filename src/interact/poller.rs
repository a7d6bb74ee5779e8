use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::browser::driver::Browser;
use crate::browser::protocol::{ElementRef, Locator};
use crate::error::{E2eError, E2eResult};

/// Sampling interval between two evaluations of a condition.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Samples a predicate at a fixed interval until it holds or a deadline passes.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Run `sample` until it returns `Ok(true)`.
    ///
    /// `sample` runs at least once, even with a zero timeout. Transient
    /// WebDriver errors (stale reference, vanished element) count as "not yet";
    /// any other error aborts the wait. Returns the time spent waiting.
    pub fn until<F>(&self, description: &str, mut sample: F) -> E2eResult<Duration>
    where
        F: FnMut() -> E2eResult<bool>,
    {
        let start = Instant::now();
        loop {
            match sample() {
                Ok(true) => return Ok(start.elapsed()),
                Ok(false) => {}
                Err(e) if e.is_transient() => {
                    trace!(condition = description, error = %e, "transient error while polling");
                }
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Err(E2eError::ConditionTimeout {
                    condition: description.to_string(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(self.interval.min(self.timeout - elapsed));
        }
    }
}

// ============================================================================
// Conditions over page state
// ============================================================================

/// A predicate over what the browser currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Current location contains the substring
    UrlContains(String),

    /// At least one element matches
    Present(Locator),

    /// The first match is displayed
    Visible(Locator),

    /// Nothing matches, or the first match is not displayed
    Hidden(Locator),

    /// Nothing matches at all
    Absent(Locator),

    /// At least `n` elements match
    CountAtLeast(Locator, usize),

    /// Fewer than `n` elements match
    CountBelow(Locator, usize),

    /// The element's `disabled` attribute is absent or one of `accepted`
    Enabled {
        element: ElementRef,
        accepted: Vec<String>,
    },

    /// The first match is a form control whose value equals the string
    ValueEquals(Locator, String),
}

impl Condition {
    pub fn evaluate(&self, browser: &mut dyn Browser) -> E2eResult<bool> {
        match self {
            Condition::UrlContains(fragment) => Ok(browser.current_url()?.contains(fragment.as_str())),
            Condition::Present(locator) => Ok(browser.count(locator)? > 0),
            Condition::Visible(locator) => match browser.find_first(locator)? {
                Some(element) => browser.is_displayed(&element),
                None => Ok(false),
            },
            Condition::Hidden(locator) => match browser.find_first(locator)? {
                Some(element) => match browser.is_displayed(&element) {
                    Ok(displayed) => Ok(!displayed),
                    // Detached while we looked at it: gone counts as hidden
                    Err(e) if e.is_transient() => Ok(true),
                    Err(e) => Err(e),
                },
                None => Ok(true),
            },
            Condition::Absent(locator) => Ok(browser.count(locator)? == 0),
            Condition::CountAtLeast(locator, n) => Ok(browser.count(locator)? >= *n),
            Condition::CountBelow(locator, n) => Ok(browser.count(locator)? < *n),
            Condition::Enabled { element, accepted } => {
                match browser.attribute(element, "disabled")? {
                    None => Ok(true),
                    Some(value) => Ok(accepted.iter().any(|a| *a == value)),
                }
            }
            Condition::ValueEquals(locator, expected) => match browser.find_first(locator)? {
                Some(element) => Ok(browser.value(&element)? == *expected),
                None => Ok(false),
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::UrlContains(fragment) => write!(f, "url contains '{}'", fragment),
            Condition::Present(l) => write!(f, "{} present", l),
            Condition::Visible(l) => write!(f, "{} visible", l),
            Condition::Hidden(l) => write!(f, "{} hidden", l),
            Condition::Absent(l) => write!(f, "{} absent", l),
            Condition::CountAtLeast(l, n) => write!(f, "count({}) >= {}", l, n),
            Condition::CountBelow(l, n) => write!(f, "count({}) < {}", l, n),
            Condition::Enabled { element, .. } => write!(f, "{} enabled", element),
            Condition::ValueEquals(l, v) => write!(f, "value of {} == '{}'", l, v),
        }
    }
}

/// A condition together with how long it may take to hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub condition: Condition,
    pub timeout: Duration,
}

impl Expectation {
    pub fn new(condition: Condition, timeout: Duration) -> Self {
        Self { condition, timeout }
    }

    /// Block until the condition holds. Returns the time waited.
    pub fn wait(&self, browser: &mut dyn Browser, interval: Duration) -> E2eResult<Duration> {
        let description = self.condition.to_string();
        Poller::new(self.timeout, interval).until(&description, || self.condition.evaluate(browser))
    }
}

/// Whether a missing outcome fails the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    /// Not observing it is recorded, never fatal
    Optional,
}

// ============================================================================
// Tiered outcome checks
// ============================================================================

/// Which tier of an `OutcomeCheck` accepted the outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Primary,
    /// A weaker criterion was accepted after every earlier tier timed out
    Fallback { index: usize, condition: String },
}

/// A primary success criterion plus ordered, weaker fallback criteria.
///
/// Fallbacks are consulted only once the primary expectation has used up its
/// whole timeout. An accepted fallback is logged at `warn`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeCheck {
    pub name: String,
    pub primary: Expectation,
    pub fallbacks: Vec<Expectation>,
}

impl OutcomeCheck {
    pub fn new(name: impl Into<String>, primary: Expectation) -> Self {
        Self {
            name: name.into(),
            primary,
            fallbacks: Vec::new(),
        }
    }

    pub fn or_accept(mut self, fallback: Expectation) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    pub fn verify(&self, browser: &mut dyn Browser, interval: Duration) -> E2eResult<Outcome> {
        let mut tried = Vec::with_capacity(self.fallbacks.len() + 1);
        let mut waited = Duration::ZERO;

        match self.primary.wait(browser, interval) {
            Ok(elapsed) => {
                debug!(check = %self.name, ?elapsed, "primary outcome observed");
                return Ok(Outcome::Primary);
            }
            Err(E2eError::ConditionTimeout { condition, timeout }) => {
                tried.push(condition);
                waited += timeout;
            }
            Err(e) => return Err(e),
        }

        for (index, fallback) in self.fallbacks.iter().enumerate() {
            match fallback.wait(browser, interval) {
                Ok(_) => {
                    let condition = fallback.condition.to_string();
                    warn!(
                        check = %self.name,
                        primary = %self.primary.condition,
                        accepted = %condition,
                        "primary outcome not observed; accepted weaker fallback"
                    );
                    return Ok(Outcome::Fallback { index, condition });
                }
                Err(E2eError::ConditionTimeout { condition, timeout }) => {
                    tried.push(condition);
                    waited += timeout;
                }
                Err(e) => return Err(e),
            }
        }

        Err(E2eError::ConditionTimeout {
            condition: format!("{}: {}", self.name, tried.join(", else ")),
            timeout: waited,
        })
    }
}
