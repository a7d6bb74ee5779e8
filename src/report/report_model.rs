use serde::Serialize;

use crate::scenario::runner::ScenarioResult;

// ============================================================================
// Suite report: aggregates ScenarioResult instances
// ============================================================================

/// Aggregated report for one invocation of the suite.
///
/// Built from a `Vec<ScenarioResult>` via `from_results()`. Consumed by the
/// console and JUnit reporters.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite_name: String,

    pub total: usize,

    pub passed: usize,

    pub failed: usize,

    /// Scenarios that passed with at least one check satisfied by a fallback
    pub passed_via_fallback: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    /// Build a suite report; totals are computed from the results.
    pub fn from_results(suite_name: &str, results: Vec<ScenarioResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let passed_via_fallback = results
            .iter()
            .filter(|r| r.passed && r.fallback_count() > 0)
            .count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            passed_via_fallback,
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}
