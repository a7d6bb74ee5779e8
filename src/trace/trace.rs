use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// What kind of primitive produced a trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Step,
    Navigate,
    Resolve,
    Act,
    Poll,
    Check,
}

/// One line of the JSONL step trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub scenario: String,
    pub step: usize,
    pub kind: TraceKind,

    /// Target label, locator, condition or URL
    pub subject: String,

    pub detail: Option<String>,
    pub outcome: Option<String>,
    pub elapsed_ms: Option<u128>,
}

impl TraceEvent {
    pub fn now(scenario: &str, step: usize, kind: TraceKind, subject: impl ToString) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            scenario: scenario.to_string(),
            step,
            kind,
            subject: subject.to_string(),
            detail: None,
            outcome: None,
            elapsed_ms: None,
        }
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = Some(elapsed.as_millis());
        self
    }
}
