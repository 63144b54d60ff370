#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use scenario_engine::notify::notifier::ProgressNotifier;
use scenario_engine::result::result_model::{
    FeatureInfo, FeatureResult, ScenarioInfo, ScenarioResult, StepInfo, StepResult,
};
use scenario_engine::runner::config::RunnerConfig;
use scenario_engine::runner::scenario::Scenario;
use scenario_engine::runner::scenario_runner::ScenarioRunner;

/// Records every progress event as a short line.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingNotifier::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressNotifier for RecordingNotifier {
    fn feature_started(&self, feature: &FeatureInfo) -> anyhow::Result<()> {
        self.push(format!("feature started: {}", feature.name));
        Ok(())
    }

    fn feature_finished(&self, feature: &FeatureResult) -> anyhow::Result<()> {
        self.push(format!("feature finished: {} ({})", feature.info().name, feature.status()));
        Ok(())
    }

    fn scenario_started(&self, scenario: &ScenarioInfo) -> anyhow::Result<()> {
        self.push(format!("scenario started: {}", scenario.name));
        Ok(())
    }

    fn scenario_finished(&self, scenario: &ScenarioResult) -> anyhow::Result<()> {
        self.push(format!("scenario finished: {} ({})", scenario.name(), scenario.status()));
        Ok(())
    }

    fn step_started(&self, step: &StepResult) -> anyhow::Result<()> {
        self.push(format!(
            "step started: {}/{} {}",
            step.number(),
            step.info().total,
            step.formatted_name()
        ));
        Ok(())
    }

    fn step_finished(&self, step: &StepResult) -> anyhow::Result<()> {
        self.push(format!("step finished: {} ({})", step.formatted_name(), step.status()));
        Ok(())
    }

    fn step_comment(&self, step: &StepInfo, comment: &str) -> anyhow::Result<()> {
        self.push(format!("comment: {} {}", step.number, comment));
        Ok(())
    }
}

/// Fails or panics on every event.
pub struct BrokenNotifier {
    pub panics: bool,
}

impl BrokenNotifier {
    fn fail(&self) -> anyhow::Result<()> {
        if self.panics {
            panic!("notifier exploded");
        }
        anyhow::bail!("notifier unavailable")
    }
}

impl ProgressNotifier for BrokenNotifier {
    fn feature_started(&self, _: &FeatureInfo) -> anyhow::Result<()> {
        self.fail()
    }

    fn feature_finished(&self, _: &FeatureResult) -> anyhow::Result<()> {
        self.fail()
    }

    fn scenario_started(&self, _: &ScenarioInfo) -> anyhow::Result<()> {
        self.fail()
    }

    fn scenario_finished(&self, _: &ScenarioResult) -> anyhow::Result<()> {
        self.fail()
    }

    fn step_started(&self, _: &StepResult) -> anyhow::Result<()> {
        self.fail()
    }

    fn step_finished(&self, _: &StepResult) -> anyhow::Result<()> {
        self.fail()
    }

    fn step_comment(&self, _: &StepInfo, _: &str) -> anyhow::Result<()> {
        self.fail()
    }
}

pub fn runner(config: RunnerConfig) -> ScenarioRunner {
    ScenarioRunner::new(Arc::new(config))
}

/// Run with the default configuration; the declaration must be valid.
pub fn run(scenario: Scenario) -> ScenarioResult {
    runner(RunnerConfig::default()).run(scenario).unwrap()
}

pub fn names(result: &ScenarioResult) -> Vec<&str> {
    result.steps().iter().map(|s| s.formatted_name()).collect()
}
