use crate::report::report_model::SuiteReport;
use crate::scenario::context::CheckStatus;

const CLASSNAME: &str = "marketplace-e2e";

// ============================================================================
// JUnit XML reporter: standard CI integration format
// ============================================================================

/// Generate a JUnit XML report for CI systems.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="..." tests="2" failures="1" time="12.034">
///   <testcase name="login" classname="marketplace-e2e" time="3.100" />
///   <testcase name="send-message" classname="marketplace-e2e" time="8.934">
///     <failure message="no matching element ..." type="locator_exhaustion">...</failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &SuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        let case_time = result.duration_ms as f64 / 1000.0;
        let notes: Vec<String> = result
            .checks
            .iter()
            .filter(|c| c.status != CheckStatus::Passed)
            .map(|c| {
                let detail = c.detail.as_deref().unwrap_or("");
                format!("Step {}: {} [{:?}] {}", c.step_index, c.check, c.status, detail)
            })
            .collect();

        if result.passed {
            if notes.is_empty() {
                cases.push_str(&format!(
                    "  <testcase name=\"{}\" classname=\"{}\" time=\"{:.3}\" />\n",
                    escape_xml(&result.scenario),
                    CLASSNAME,
                    case_time
                ));
            } else {
                cases.push_str(&format!(
                    "  <testcase name=\"{name}\" classname=\"{class}\" time=\"{time:.3}\">\n    <system-out>{out}</system-out>\n  </testcase>\n",
                    name = escape_xml(&result.scenario),
                    class = CLASSNAME,
                    time = case_time,
                    out = escape_xml(&notes.join("\n")),
                ));
            }
            continue;
        }

        let failure_message = result.error.as_deref().unwrap_or("scenario failed");
        let failure_type = result.failure.map(|c| c.code()).unwrap_or("failure");

        let mut body_parts = notes;
        if let Some(error) = &result.error {
            body_parts.push(format!("Error: {}", error));
        }

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"{class}\" time=\"{time:.3}\">\n    <failure message=\"{message}\" type=\"{kind}\">{body}</failure>\n  </testcase>\n",
            name = escape_xml(&result.scenario),
            class = CLASSNAME,
            time = case_time,
            message = escape_xml(failure_message),
            kind = failure_type,
            body = escape_xml(&body_parts.join("\n")),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
