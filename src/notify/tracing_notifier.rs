use tracing::{debug, info};

use crate::notify::notifier::ProgressNotifier;
use crate::result::result_model::{
    FeatureInfo, FeatureResult, ScenarioInfo, ScenarioResult, StepInfo, StepResult,
};

/// Emits progress events as `tracing` events: features and scenarios at
/// info, steps at debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressNotifier;

impl ProgressNotifier for TracingProgressNotifier {
    fn feature_started(&self, feature: &FeatureInfo) -> anyhow::Result<()> {
        info!(feature = %feature.name, "feature started");
        Ok(())
    }

    fn feature_finished(&self, feature: &FeatureResult) -> anyhow::Result<()> {
        info!(
            feature = %feature.info().name,
            status = %feature.status(),
            scenarios = feature.scenario_count(),
            "feature finished"
        );
        Ok(())
    }

    fn scenario_started(&self, scenario: &ScenarioInfo) -> anyhow::Result<()> {
        info!(scenario = %scenario.name, "scenario started");
        Ok(())
    }

    fn scenario_finished(&self, scenario: &ScenarioResult) -> anyhow::Result<()> {
        let elapsed_ms = scenario
            .execution_time()
            .map(|t| t.duration().as_millis() as u64)
            .unwrap_or_default();
        info!(
            scenario = %scenario.name(),
            status = %scenario.status(),
            elapsed_ms,
            "scenario finished"
        );
        Ok(())
    }

    fn step_started(&self, step: &StepResult) -> anyhow::Result<()> {
        debug!(step = step.number(), name = %step.formatted_name(), "step started");
        Ok(())
    }

    fn step_finished(&self, step: &StepResult) -> anyhow::Result<()> {
        debug!(
            step = step.number(),
            name = %step.formatted_name(),
            status = %step.status(),
            "step finished"
        );
        Ok(())
    }

    fn step_comment(&self, step: &StepInfo, comment: &str) -> anyhow::Result<()> {
        debug!(step = step.number, comment, "step comment");
        Ok(())
    }
}
