use crate::report::report_model::SuiteReport;
use crate::scenario::context::CheckStatus;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a suite report for terminal output.
///
/// Produces output like:
/// ```text
/// === Test Suite: marketplace ===
///
/// ✓ PASS  login (2 steps, 1 checks)
/// ✓ PASS  report-product (6 steps, 1 checks)
///     [FALLBACK] Step 6: report sent, accepted: report dialog hidden
/// ✗ FAIL  send-message (2 steps, 0 checks) [locator exhaustion]
///     [ERROR] Step 2 failed: no matching element for contact seller button; tried: ...
///
/// === Results: 2 passed, 1 failed (3 total) in 41.2s ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Suite: {} ===\n\n", report.suite_name));

    for result in &report.results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };

        out.push_str(&format!(
            "{}  {} ({} steps, {} checks)",
            marker,
            result.scenario,
            result.steps_run,
            result.checks.len()
        ));
        if let Some(category) = result.failure {
            out.push_str(&format!(" [{}]", category));
        }
        out.push('\n');

        if let Some(ref error) = result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }

        for check in &result.checks {
            let tag = match check.status {
                CheckStatus::Passed => continue,
                CheckStatus::PassedViaFallback => "FALLBACK",
                CheckStatus::NotObserved => "NOT SEEN",
                CheckStatus::Failed => "FAIL",
            };
            match &check.detail {
                Some(detail) => out.push_str(&format!(
                    "    [{}] Step {}: {}, {}\n",
                    tag, check.step_index, check.check, detail
                )),
                None => out.push_str(&format!(
                    "    [{}] Step {}: {}\n",
                    tag, check.step_index, check.check
                )),
            }
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    if report.passed_via_fallback > 0 {
        out.push_str(&format!(
            "({} passed only through a fallback check)\n",
            report.passed_via_fallback
        ));
    }

    out
}
