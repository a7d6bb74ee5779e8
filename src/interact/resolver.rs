use std::time::Duration;

use tracing::{debug, trace};

use crate::browser::driver::Browser;
use crate::browser::protocol::{ElementRef, Locator};
use crate::error::{E2eError, E2eResult};
use crate::interact::poller::Poller;

/// What a matched element must satisfy before it is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actionability {
    /// Attached to the DOM
    Present,
    /// Displayed
    Visible,
    /// Displayed and enabled
    Clickable,
}

impl Actionability {
    fn check(&self, browser: &mut dyn Browser, element: &ElementRef) -> E2eResult<bool> {
        match self {
            Actionability::Present => Ok(true),
            Actionability::Visible => browser.is_displayed(element),
            Actionability::Clickable => Ok(browser.is_displayed(element)? && browser.is_enabled(element)?),
        }
    }
}

/// One locator to try, optionally with its own timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub locator: Locator,
    pub timeout: Option<Duration>,
}

/// An ordered list of alternative locators for the same UI target.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateList {
    pub target: String,
    pub candidates: Vec<Candidate>,
}

impl CandidateList {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            candidates: Vec::new(),
        }
    }

    /// Single-locator list.
    pub fn single(target: impl Into<String>, locator: Locator) -> Self {
        Self::new(target).or(locator)
    }

    /// Append a candidate that uses the caller's default timeout.
    pub fn or(mut self, locator: Locator) -> Self {
        self.candidates.push(Candidate {
            locator,
            timeout: None,
        });
        self
    }

    /// Append a candidate with its own timeout.
    pub fn or_within(mut self, locator: Locator, timeout: Duration) -> Self {
        self.candidates.push(Candidate {
            locator,
            timeout: Some(timeout),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// The element a resolution settled on, and which candidate produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub element: ElementRef,
    pub candidate_index: usize,
    pub locator: Locator,
}

/// Where to look for matches.
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    Document,
    Within(&'a ElementRef),
}

/// Try each candidate in order and return the first actionable match.
///
/// Every candidate is polled for its own timeout (or `default_timeout`); a
/// candidate that times out hands over to the next one. Earlier candidates are
/// never revisited once a later one is being tried.
pub fn resolve(
    browser: &mut dyn Browser,
    candidates: &CandidateList,
    actionability: Actionability,
    default_timeout: Duration,
    interval: Duration,
) -> E2eResult<Resolved> {
    resolve_in_scope(browser, Scope::Document, candidates, actionability, default_timeout, interval)
}

/// Like `resolve`, restricted to descendants of `parent`.
pub fn resolve_within(
    browser: &mut dyn Browser,
    parent: &ElementRef,
    candidates: &CandidateList,
    actionability: Actionability,
    default_timeout: Duration,
    interval: Duration,
) -> E2eResult<Resolved> {
    resolve_in_scope(
        browser,
        Scope::Within(parent),
        candidates,
        actionability,
        default_timeout,
        interval,
    )
}

fn resolve_in_scope(
    browser: &mut dyn Browser,
    scope: Scope<'_>,
    candidates: &CandidateList,
    actionability: Actionability,
    default_timeout: Duration,
    interval: Duration,
) -> E2eResult<Resolved> {
    let mut attempted = Vec::with_capacity(candidates.len());

    for (index, candidate) in candidates.candidates.iter().enumerate() {
        let timeout = candidate.timeout.unwrap_or(default_timeout);
        let description = format!("{} via {}", candidates.target, candidate.locator);
        let mut found = None;

        let outcome = Poller::new(timeout, interval).until(&description, || {
            let first = match scope {
                Scope::Document => browser.find_first(&candidate.locator)?,
                Scope::Within(parent) => browser
                    .find_all_within(parent, &candidate.locator)?
                    .into_iter()
                    .next(),
            };
            let Some(element) = first else {
                return Ok(false);
            };
            if actionability.check(browser, &element)? {
                found = Some(element);
                return Ok(true);
            }
            Ok(false)
        });

        match outcome {
            Ok(_) => {
                if let Some(element) = found {
                    debug!(
                        ui_target = %candidates.target,
                        candidate = index,
                        locator = %candidate.locator,
                        "resolved element"
                    );
                    return Ok(Resolved {
                        element,
                        candidate_index: index,
                        locator: candidate.locator.clone(),
                    });
                }
            }
            Err(E2eError::ConditionTimeout { .. }) => {
                trace!(ui_target = %candidates.target, locator = %candidate.locator, "candidate timed out");
            }
            Err(e) => return Err(e),
        }
        attempted.push(candidate.locator.to_string());
    }

    Err(E2eError::LocatorExhausted {
        target: candidates.target.clone(),
        attempted,
    })
}
