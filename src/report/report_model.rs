use serde::Serialize;

use crate::result::result_model::{FeatureResult, RunResult, ScenarioResult};
use crate::result::status::ExecutionStatus;

// ============================================================================
// Run summary: flattened snapshot of a run for reporters
// ============================================================================

/// Snapshot of a run's results, shaped for reporters.
///
/// Built from a [`RunResult`] via `from_run()`. Consumed by the console,
/// JUnit and JSON reporters. Scenario results are copied, so the summary
/// stays valid while the run keeps accepting results.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Name of the run
    pub suite_name: String,

    /// Scenario counts across all features
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub ignored: usize,
    pub bypassed: usize,

    /// Wall time covered by the run in milliseconds (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub features: Vec<FeatureSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureSummary {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub status: ExecutionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub scenarios: Vec<ScenarioResult>,
}

impl FeatureSummary {
    pub fn from_feature(feature: &FeatureResult) -> Self {
        FeatureSummary {
            name: feature.info().name.clone(),
            description: feature.info().description.clone(),
            status: feature.status(),
            duration_ms: feature.execution_time().map(|t| t.duration().as_millis()),
            scenarios: feature.scenarios().map(|s| s.as_ref().clone()).collect(),
        }
    }
}

impl RunSummary {
    /// Build a summary from the features finished so far.
    ///
    /// Counts come from the copied scenarios, so they always agree with
    /// `features`.
    pub fn from_run(suite_name: &str, run: &RunResult) -> Self {
        let features: Vec<FeatureSummary> = run
            .features()
            .map(|f| FeatureSummary::from_feature(&f))
            .collect();
        let count = |status: ExecutionStatus| {
            features
                .iter()
                .flat_map(|f| &f.scenarios)
                .filter(|s| s.status() == status)
                .count()
        };
        RunSummary {
            suite_name: suite_name.to_string(),
            total: features.iter().map(|f| f.scenarios.len()).sum(),
            passed: count(ExecutionStatus::Passed),
            failed: count(ExecutionStatus::Failed),
            ignored: count(ExecutionStatus::Ignored),
            bypassed: count(ExecutionStatus::Bypassed),
            duration_ms: run.execution_time().map(|t| t.duration().as_millis()),
            features,
        }
    }

    /// Override the measured duration (e.g. with the caller's own stopwatch).
    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Whether no scenario failed. Ignored and bypassed scenarios do not
    /// count as failures.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.features.iter().flat_map(|f| f.scenarios.iter())
    }
}
