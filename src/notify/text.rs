use std::fmt;

use crate::notify::notifier::ProgressNotifier;
use crate::result::result_model::{
    FeatureInfo, FeatureResult, ScenarioInfo, ScenarioResult, StepInfo, StepResult,
};
use crate::time::execution_time::format_duration;

type LineSink = Box<dyn Fn(&str) + Send + Sync>;

// ============================================================================
// Line-oriented progress output
// ============================================================================

/// Writes one line of text per progress event.
///
/// ```text
/// FEATURE: [Story-1] Invoice
/// SCENARIO: Receiving invoice for products
///   STEP 1/3: GIVEN product "wooden desk" is available...
///   STEP 1/3: GIVEN product "wooden desk" is available (Passed after 51ms)
///   SCENARIO RESULT: Passed after 153ms
/// FEATURE FINISHED: Invoice
/// ```
pub struct TextProgressNotifier {
    sink: LineSink,
}

impl TextProgressNotifier {
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        TextProgressNotifier {
            sink: Box::new(sink),
        }
    }

    /// Print lines to stdout.
    pub fn stdout() -> Self {
        TextProgressNotifier::new(|line| println!("{}", line))
    }

    /// Print lines to stderr, leaving stdout to reports.
    pub fn stderr() -> Self {
        TextProgressNotifier::new(|line| eprintln!("{}", line))
    }

    fn write(&self, line: String) {
        (self.sink)(&line);
    }
}

impl fmt::Debug for TextProgressNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextProgressNotifier").finish_non_exhaustive()
    }
}

impl ProgressNotifier for TextProgressNotifier {
    fn feature_started(&self, feature: &FeatureInfo) -> anyhow::Result<()> {
        self.write(format!("FEATURE: {}{}", labels(&feature.labels), feature.name));
        if let Some(description) = &feature.description {
            for line in description.lines() {
                self.write(format!("  {}", line.trim()));
            }
        }
        Ok(())
    }

    fn feature_finished(&self, feature: &FeatureResult) -> anyhow::Result<()> {
        self.write(format!("FEATURE FINISHED: {}", feature.info().name));
        Ok(())
    }

    fn scenario_started(&self, scenario: &ScenarioInfo) -> anyhow::Result<()> {
        self.write(format!("SCENARIO: {}{}", labels(&scenario.labels), scenario.name));
        Ok(())
    }

    fn scenario_finished(&self, scenario: &ScenarioResult) -> anyhow::Result<()> {
        let elapsed = scenario
            .execution_time()
            .map(|t| format!(" after {}", format_duration(t.duration())))
            .unwrap_or_default();
        self.write(format!("  SCENARIO RESULT: {}{}", scenario.status(), elapsed));
        if let Some(details) = scenario.status_details() {
            for line in details.lines() {
                self.write(format!("    {}", line));
            }
        }
        Ok(())
    }

    fn step_started(&self, step: &StepResult) -> anyhow::Result<()> {
        self.write(format!(
            "  STEP {}/{}: {}...",
            step.info().number,
            step.info().total,
            step.formatted_name()
        ));
        Ok(())
    }

    fn step_finished(&self, step: &StepResult) -> anyhow::Result<()> {
        let elapsed = step
            .execution_time()
            .map(|t| format!(" after {}", format_duration(t.duration())))
            .unwrap_or_default();
        self.write(format!(
            "  STEP {}/{}: {} ({}{})",
            step.info().number,
            step.info().total,
            step.formatted_name(),
            step.status(),
            elapsed
        ));
        Ok(())
    }

    fn step_comment(&self, step: &StepInfo, comment: &str) -> anyhow::Result<()> {
        self.write(format!("  STEP {}/{}: /* {} */", step.number, step.total, comment));
        Ok(())
    }
}

fn labels(labels: &[String]) -> String {
    labels.iter().map(|l| format!("[{}] ", l)).collect()
}
