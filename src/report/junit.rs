use crate::report::report_model::{FeatureSummary, RunSummary};
use crate::result::result_model::ScenarioResult;
use crate::result::status::ExecutionStatus;

// ============================================================================
// JUnit XML: one testsuite per feature, one testcase per scenario
// ============================================================================

/// Generate a JUnit XML report for CI systems (Jenkins, GitHub Actions, GitLab CI).
///
/// One `<testsuite>` per feature, one `<testcase>` per scenario:
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuites name="Demo" tests="3" failures="1" skipped="1" time="0.412">
///   <testsuite name="Invoice" tests="3" failures="1" skipped="1" time="0.412">
///     <testcase name="Receiving invoice" classname="Invoice" time="0.153" />
///     <testcase name="Expired card" classname="Invoice" time="0.051">
///       <failure message="Step 2: card expired" type="StepFailure">...</failure>
///     </testcase>
///     <testcase name="Gift wrap" classname="Invoice" time="0.000">
///       <skipped message="not in this release" />
///     </testcase>
///   </testsuite>
/// </testsuites>
/// ```
pub fn generate_junit_xml(report: &RunSummary) -> String {
    let suites: String = report.features.iter().map(feature_suite).collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\" skipped=\"{skipped}\"{time}>\n{suites}</testsuites>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        skipped = report.ignored + report.bypassed,
        time = time_attr(report.duration_ms),
        suites = suites,
    )
}

fn feature_suite(feature: &FeatureSummary) -> String {
    let failures = count(feature, |s| s == ExecutionStatus::Failed);
    let skipped = count(feature, |s| {
        matches!(s, ExecutionStatus::Ignored | ExecutionStatus::Bypassed)
    });

    let mut cases = String::new();
    for scenario in &feature.scenarios {
        cases.push_str(&scenario_case(&feature.name, scenario));
    }

    format!(
        "  <testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\" skipped=\"{skipped}\"{time}>\n{cases}  </testsuite>\n",
        name = escape_xml(&feature.name),
        tests = feature.scenarios.len(),
        failures = failures,
        skipped = skipped,
        time = time_attr(feature.duration_ms),
        cases = cases,
    )
}

fn scenario_case(feature: &str, scenario: &ScenarioResult) -> String {
    let open = format!(
        "    <testcase name=\"{}\" classname=\"{}\"{}",
        escape_xml(scenario.name()),
        escape_xml(feature),
        time_attr(scenario.execution_time().map(|t| t.duration().as_millis()))
    );
    let message = scenario.status_details().unwrap_or("");

    match scenario.status() {
        ExecutionStatus::Failed => {
            let body: Vec<String> = scenario
                .steps()
                .iter()
                .map(|step| {
                    format!(
                        "{}. {} [{}]",
                        step.number(),
                        step.formatted_name(),
                        step.status()
                    )
                })
                .collect();
            format!(
                "{open}>\n      <failure message=\"{message}\" type=\"StepFailure\">{body}</failure>\n    </testcase>\n",
                open = open,
                message = escape_xml(message),
                body = escape_xml(&body.join("\n")),
            )
        }
        ExecutionStatus::Ignored | ExecutionStatus::Bypassed => format!(
            "{open}>\n      <skipped message=\"{message}\" />\n    </testcase>\n",
            open = open,
            message = escape_xml(message),
        ),
        ExecutionStatus::Passed | ExecutionStatus::NotRun => format!("{} />\n", open),
    }
}

fn count(feature: &FeatureSummary, matches: impl Fn(ExecutionStatus) -> bool) -> usize {
    feature
        .scenarios
        .iter()
        .filter(|s| matches(s.status()))
        .count()
}

fn time_attr(duration_ms: Option<u128>) -> String {
    duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default()
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
