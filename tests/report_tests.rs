use std::sync::Arc;

use scenario_engine::cli::commands::render_report;
use scenario_engine::report::console::format_console_report;
use scenario_engine::report::junit::{escape_xml, generate_junit_xml};
use scenario_engine::report::report_model::RunSummary;
use scenario_engine::result::result_model::{FeatureInfo, RunResult};
use scenario_engine::result::status::{ExecutionStatus, StatusResolver};
use scenario_engine::runner::config::RunnerConfig;
use scenario_engine::runner::coordinator::RunCoordinator;
use scenario_engine::runner::scenario::Scenario;
use scenario_engine::step::error::StepIgnored;
use scenario_engine::step::step_model::Step;

// ============================================================================
// Helper builders
// ============================================================================

fn mixed_run() -> Arc<RunResult> {
    let coordinator = RunCoordinator::new(
        RunnerConfig::new().with_status_resolver(StatusResolver::with_signals()),
    );

    let invoice = coordinator.feature(FeatureInfo::new("Invoice")).unwrap();
    invoice
        .run_scenario(
            Scenario::new("Receiving invoice")
                .step(
                    Step::new("given", "product {} is stored", || Ok(())).param("product", "desk"),
                )
                .step(Step::new("then", "invoice is sent", || Ok(()))),
        )
        .unwrap();
    invoice
        .run_scenario(
            Scenario::new("Paying <expired> card")
                .step(Step::new("when", "customer pays", || anyhow::bail!("card & pin rejected")))
                .step(Step::new("then", "order is confirmed", || Ok(()))),
        )
        .unwrap();
    invoice.finish();

    let discounts = coordinator
        .feature(FeatureInfo::new("Discounts").with_description("Seasonal offers"))
        .unwrap();
    discounts
        .run_scenario(Scenario::new("Winter code").step(Step::new("when", "code is applied", || {
            Err(StepIgnored::new("disabled").into())
        })))
        .unwrap();
    discounts
        .skip_scenario(
            Scenario::new("Gift wrap").step(Step::new("given", "wrapping", || Ok(()))),
            "not offered yet",
        )
        .unwrap();
    discounts.finish();

    coordinator.finish()
}

fn mixed_summary() -> RunSummary {
    RunSummary::from_run("Acceptance", &mixed_run())
}

// ============================================================================
// 1. Run summary
// ============================================================================

#[test]
fn summary_counts_every_status() {
    let report = mixed_summary();
    assert_eq!(report.suite_name, "Acceptance");
    assert_eq!(report.total, 4);
    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.ignored, 1);
    assert_eq!(report.bypassed, 1);
    assert!(!report.all_passed());
    assert_eq!(report.features.len(), 2);
    assert_eq!(report.features[0].status, ExecutionStatus::Failed);
    assert_eq!(report.features[1].status, ExecutionStatus::Ignored);
    assert!(report.duration_ms.is_some());
}

#[test]
fn summary_with_only_ignored_and_bypassed_passes() {
    let coordinator = RunCoordinator::new(RunnerConfig::default());
    let feature = coordinator.feature(FeatureInfo::new("Later")).unwrap();
    feature
        .skip_scenario(Scenario::new("one"), "later")
        .unwrap();
    feature.finish();

    let report = RunSummary::from_run("Later", &coordinator.finish()).with_duration(1234);
    assert!(report.all_passed());
    assert_eq!(report.duration_ms, Some(1234));
}

#[test]
fn empty_run_summary() {
    let report = RunSummary::from_run("Nothing", &RunResult::new());
    assert_eq!(report.total, 0);
    assert!(report.all_passed());
    assert_eq!(report.duration_ms, None);
    assert_eq!(report.scenarios().count(), 0);
}

// ============================================================================
// 2. Console report
// ============================================================================

#[test]
fn console_report_lists_features_and_scenarios() {
    let output = format_console_report(&mixed_summary().with_duration(2500));

    assert!(output.starts_with("=== Test Run: Acceptance ===\n"));
    assert!(output.contains("FEATURE: Invoice\n"));
    assert!(output.contains("\u{2713} PASS      Receiving invoice (2 steps"));
    assert!(output.contains("\u{2717} FAIL      Paying <expired> card (2 steps"));
    assert!(output.contains("[FAILED] Step 1: WHEN customer pays - card & pin rejected"));
    assert!(output.contains("[NOT RUN] Step 2: THEN order is confirmed"));
    assert!(output.contains("\u{25cb} IGNORED   Winter code"));
    assert!(output.contains("- BYPASSED  Gift wrap"));
    assert!(output.contains("[BYPASSED] not offered yet"));
    assert!(output.ends_with(
        "=== Results: 1 passed, 1 failed, 1 ignored, 1 bypassed (4 total) in 2.5s ===\n"
    ));
}

#[test]
fn passing_scenarios_do_not_list_steps() {
    let output = format_console_report(&mixed_summary());
    assert!(!output.contains("product \"desk\" is stored"));
}

// ============================================================================
// 3. JUnit XML
// ============================================================================

#[test]
fn junit_has_one_suite_per_feature() {
    let xml = generate_junit_xml(&mixed_summary());

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    assert!(xml.contains(
        "<testsuites name=\"Acceptance\" tests=\"4\" failures=\"1\" skipped=\"2\""
    ));
    assert!(xml.contains("<testsuite name=\"Invoice\" tests=\"2\" failures=\"1\" skipped=\"0\""));
    assert!(xml.contains("<testsuite name=\"Discounts\" tests=\"2\" failures=\"0\" skipped=\"2\""));
    assert_eq!(xml.matches("<testsuite ").count(), 2);
    assert_eq!(xml.matches("<testcase ").count(), 4);
    assert!(xml.trim_end().ends_with("</testsuites>"));
}

#[test]
fn junit_escapes_and_marks_failures() {
    let xml = generate_junit_xml(&mixed_summary());

    assert!(xml.contains("name=\"Paying &lt;expired&gt; card\""));
    assert!(xml.contains(
        "<failure message=\"Step 1: card &amp; pin rejected\" type=\"StepFailure\">"
    ));
    assert!(xml.contains("<skipped message=\"not offered yet\" />"));
    assert!(xml.contains("<skipped message=\"Step 1: step ignored: disabled\" />"));
}

#[test]
fn escape_xml_handles_all_special_characters() {
    assert_eq!(
        escape_xml("<a href=\"x\">'&'</a>"),
        "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;"
    );
}

// ============================================================================
// 4. JSON and format selection
// ============================================================================

#[test]
fn json_report_carries_the_result_tree() {
    let json = render_report(&mixed_summary(), "json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["suite_name"], "Acceptance");
    assert_eq!(value["failed"], 1);
    let scenario = &value["features"][0]["scenarios"][1];
    assert_eq!(scenario["status"], "Failed");
    assert_eq!(scenario["steps"][0]["formatted_name"], "WHEN customer pays");
    assert_eq!(scenario["steps"][1]["status"], "NotRun");
}

#[test]
fn unknown_report_format_is_an_error() {
    let err = render_report(&mixed_summary(), "html").unwrap_err();
    assert!(err.to_string().contains("unknown report format 'html'"));
}

#[test]
fn report_file_can_be_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xml");
    std::fs::write(&path, render_report(&mixed_summary(), "junit").unwrap()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("<testsuites"));
}
