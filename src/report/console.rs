use crate::report::report_model::RunSummary;
use crate::result::result_model::ScenarioResult;
use crate::result::status::ExecutionStatus;
use crate::time::execution_time::format_duration;

// ============================================================================
// Console report: one line per scenario, details for the ones that did not pass
// ============================================================================

/// Format a run summary for terminal output.
///
/// Produces output like:
/// ```text
/// === Test Run: Demo ===
///
/// FEATURE: Invoice
///   ✓ PASS      Receiving invoice for products (7 steps, 362ms)
///   ✗ FAIL      Paying with an expired card (3 steps, 51ms)
///       [FAILED] Step 2: WHEN customer pays with card "4111" - card expired
///       [NOT RUN] Step 3: THEN order is confirmed
///
/// === Results: 1 passed, 1 failed, 0 ignored, 0 bypassed (2 total) in 0.4s ===
/// ```
pub fn format_console_report(report: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Test Run: {} ===\n", report.suite_name));

    for feature in &report.features {
        out.push_str(&format!("\nFEATURE: {}\n", feature.name));

        for scenario in &feature.scenarios {
            let elapsed = scenario
                .execution_time()
                .map(|t| format!(", {}", format_duration(t.duration())))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {}  {} ({} steps{})\n",
                marker(scenario.status()),
                scenario.name(),
                scenario.steps().len(),
                elapsed
            ));

            // Steps are only listed for scenarios that did not pass cleanly
            if scenario.status() != ExecutionStatus::Passed {
                push_step_lines(&mut out, scenario);
            }
        }
    }

    // Summary line
    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed, {} ignored, {} bypassed ({} total)",
        report.passed, report.failed, report.ignored, report.bypassed, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}

fn push_step_lines(out: &mut String, scenario: &ScenarioResult) {
    if scenario.steps().iter().all(|s| s.status() == ExecutionStatus::NotRun) {
        if let Some(reason) = scenario.status_details() {
            out.push_str(&format!("      [BYPASSED] {}\n", reason));
        }
        return;
    }

    for step in scenario.steps() {
        if step.status() == ExecutionStatus::Passed {
            continue;
        }
        let tag = match step.status() {
            ExecutionStatus::NotRun => "NOT RUN",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Ignored => "IGNORED",
            ExecutionStatus::Bypassed => "BYPASSED",
            ExecutionStatus::Passed => "PASSED",
        };
        match step.status_details() {
            Some(details) => out.push_str(&format!(
                "      [{}] Step {}: {} - {}\n",
                tag,
                step.number(),
                step.formatted_name(),
                details
            )),
            None => out.push_str(&format!(
                "      [{}] Step {}: {}\n",
                tag,
                step.number(),
                step.formatted_name()
            )),
        }
    }
}

fn marker(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Passed => "\u{2713} PASS    ",
        ExecutionStatus::Failed => "\u{2717} FAIL    ",
        ExecutionStatus::Ignored => "\u{25cb} IGNORED ",
        ExecutionStatus::Bypassed => "- BYPASSED",
        ExecutionStatus::NotRun => "  NOT RUN ",
    }
}
