use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::result::result_model::{
    FeatureInfo, FeatureResult, ScenarioInfo, ScenarioResult, StepInfo, StepResult,
};
use crate::step::error::StepPanicked;

/// Receives progress events while features, scenarios and steps run.
///
/// Every method defaults to doing nothing. Notifiers are best-effort: an
/// error or a panic from any method is logged and otherwise ignored, it
/// never changes a result or stops a scenario.
pub trait ProgressNotifier: Send + Sync {
    fn feature_started(&self, _feature: &FeatureInfo) -> anyhow::Result<()> {
        Ok(())
    }

    fn feature_finished(&self, _feature: &FeatureResult) -> anyhow::Result<()> {
        Ok(())
    }

    fn scenario_started(&self, _scenario: &ScenarioInfo) -> anyhow::Result<()> {
        Ok(())
    }

    fn scenario_finished(&self, _scenario: &ScenarioResult) -> anyhow::Result<()> {
        Ok(())
    }

    /// The step's name is already formatted with its captured arguments.
    fn step_started(&self, _step: &StepResult) -> anyhow::Result<()> {
        Ok(())
    }

    fn step_finished(&self, _step: &StepResult) -> anyhow::Result<()> {
        Ok(())
    }

    fn step_comment(&self, _step: &StepInfo, _comment: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Notifier that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgressNotifier;

impl ProgressNotifier for NoProgressNotifier {}

/// Forwards every event to each of its notifiers in order.
///
/// A failing notifier does not keep the others from being called.
#[derive(Clone, Default)]
pub struct CompositeNotifier {
    notifiers: Vec<Arc<dyn ProgressNotifier>>,
}

impl CompositeNotifier {
    pub fn new(notifiers: Vec<Arc<dyn ProgressNotifier>>) -> Self {
        CompositeNotifier { notifiers }
    }

    pub fn push(&mut self, notifier: Arc<dyn ProgressNotifier>) {
        self.notifiers.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    fn each(
        &self,
        event: &'static str,
        call: impl Fn(&dyn ProgressNotifier) -> anyhow::Result<()>,
    ) {
        for notifier in &self.notifiers {
            notify_safely(event, || call(notifier.as_ref()));
        }
    }
}

impl ProgressNotifier for CompositeNotifier {
    fn feature_started(&self, feature: &FeatureInfo) -> anyhow::Result<()> {
        self.each("feature_started", |n| n.feature_started(feature));
        Ok(())
    }

    fn feature_finished(&self, feature: &FeatureResult) -> anyhow::Result<()> {
        self.each("feature_finished", |n| n.feature_finished(feature));
        Ok(())
    }

    fn scenario_started(&self, scenario: &ScenarioInfo) -> anyhow::Result<()> {
        self.each("scenario_started", |n| n.scenario_started(scenario));
        Ok(())
    }

    fn scenario_finished(&self, scenario: &ScenarioResult) -> anyhow::Result<()> {
        self.each("scenario_finished", |n| n.scenario_finished(scenario));
        Ok(())
    }

    fn step_started(&self, step: &StepResult) -> anyhow::Result<()> {
        self.each("step_started", |n| n.step_started(step));
        Ok(())
    }

    fn step_finished(&self, step: &StepResult) -> anyhow::Result<()> {
        self.each("step_finished", |n| n.step_finished(step));
        Ok(())
    }

    fn step_comment(&self, step: &StepInfo, comment: &str) -> anyhow::Result<()> {
        self.each("step_comment", |n| n.step_comment(step, comment));
        Ok(())
    }
}

/// Run one notifier call, logging and swallowing errors and panics.
pub(crate) fn notify_safely<F>(event: &'static str, call: F)
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::warn!(event, error = %err, "progress notifier failed");
        }
        Err(payload) => {
            let panicked = StepPanicked::from_payload(&*payload);
            tracing::warn!(event, panic = %panicked.message, "progress notifier panicked");
        }
    }
}
