use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::result::aggregator::{Aggregator, Iter};
use crate::result::status::{ExecutionStatus, aggregate_status};
use crate::step::parameters::StepParameters;
use crate::time::execution_time::ExecutionTime;

// ============================================================================
// Identity
// ============================================================================

/// Identity of one step occurrence within its scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// 1-based position in the scenario.
    pub number: usize,

    /// Number of steps declared in the scenario.
    pub total: usize,

    /// Free-form step type (given/when/then, setup, ...). Not interpreted.
    pub keyword: String,

    pub template: String,

    pub parameters: StepParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl ScenarioInfo {
    pub fn new(name: impl Into<String>) -> Self {
        ScenarioInfo {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl FeatureInfo {
    pub fn new(name: impl Into<String>) -> Self {
        FeatureInfo {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }
}

// ============================================================================
// Step result
// ============================================================================

/// Result of one step.
///
/// Starts as `NotRun` with no execution time and is finalized once by the
/// scenario runner. Only the runner can change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    info: StepInfo,
    status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    execution_time: Option<ExecutionTime>,
    formatted_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    comments: Vec<String>,
}

impl StepResult {
    pub(crate) fn not_run(info: StepInfo, formatted_name: String) -> Self {
        StepResult {
            info,
            status: ExecutionStatus::NotRun,
            status_details: None,
            execution_time: None,
            formatted_name,
            comments: Vec::new(),
        }
    }

    /// Record the captured parameters and the name formatted from them.
    pub(crate) fn set_resolved_name(&mut self, parameters: StepParameters, formatted_name: String) {
        self.info.parameters = parameters;
        self.formatted_name = formatted_name;
    }

    pub(crate) fn finish(
        &mut self,
        status: ExecutionStatus,
        status_details: Option<String>,
        execution_time: ExecutionTime,
        comments: Vec<String>,
    ) {
        debug_assert_eq!(self.status, ExecutionStatus::NotRun, "step result finalized twice");
        self.status = status;
        self.status_details = status_details;
        self.execution_time = Some(execution_time);
        self.comments = comments;
    }

    pub fn info(&self) -> &StepInfo {
        &self.info
    }

    pub fn number(&self) -> usize {
        self.info.number
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn status_details(&self) -> Option<&str> {
        self.status_details.as_deref()
    }

    pub fn execution_time(&self) -> Option<&ExecutionTime> {
        self.execution_time.as_ref()
    }

    pub fn formatted_name(&self) -> &str {
        &self.formatted_name
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}

// ============================================================================
// Scenario result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    info: ScenarioInfo,
    status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    execution_time: Option<ExecutionTime>,
    steps: Vec<StepResult>,
}

impl ScenarioResult {
    pub(crate) fn new(info: ScenarioInfo, steps: Vec<StepResult>) -> Self {
        ScenarioResult {
            info,
            status: ExecutionStatus::NotRun,
            status_details: None,
            execution_time: None,
            steps,
        }
    }

    /// Seal the scenario: status derived from its steps, details taken from
    /// the first step that has any.
    pub(crate) fn finish(&mut self, execution_time: ExecutionTime) {
        self.status = aggregate_status(self.steps.iter().map(|s| s.status()));
        self.status_details = self.steps.iter().find_map(|s| {
            s.status_details()
                .map(|d| format!("Step {}: {}", s.number(), d))
        });
        self.execution_time = Some(execution_time);
    }

    /// Seal a scenario that was declared but deliberately not executed.
    pub(crate) fn finish_bypassed(&mut self, execution_time: ExecutionTime, reason: String) {
        self.status = ExecutionStatus::Bypassed;
        self.status_details = Some(reason);
        self.execution_time = Some(execution_time);
    }

    pub fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn status_details(&self) -> Option<&str> {
        self.status_details.as_deref()
    }

    pub fn execution_time(&self) -> Option<&ExecutionTime> {
        self.execution_time.as_ref()
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }
}

// ============================================================================
// Feature and run results
// ============================================================================

/// Scenario results of one feature, appended concurrently as scenarios finish.
#[derive(Debug, Serialize)]
pub struct FeatureResult {
    info: FeatureInfo,
    scenarios: Aggregator<ScenarioResult>,
}

impl FeatureResult {
    pub fn new(info: FeatureInfo) -> Self {
        FeatureResult {
            info,
            scenarios: Aggregator::new(),
        }
    }

    pub fn info(&self) -> &FeatureInfo {
        &self.info
    }

    pub fn add_scenario(&self, scenario: ScenarioResult) -> Arc<ScenarioResult> {
        self.scenarios.add(scenario)
    }

    pub fn scenarios(&self) -> Iter<'_, ScenarioResult> {
        self.scenarios.iter()
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    pub fn status(&self) -> ExecutionStatus {
        aggregate_status(self.scenarios.iter().map(|s| s.status()))
    }

    /// Time span covering every scenario, if any has a time.
    pub fn execution_time(&self) -> Option<ExecutionTime> {
        span_of(self.scenarios.iter().filter_map(|s| s.execution_time().copied()))
    }

    pub fn count_by_status(&self) -> BTreeMap<ExecutionStatus, usize> {
        count(self.scenarios.iter().map(|s| s.status()))
    }
}

/// Feature results of a whole run.
#[derive(Debug, Default, Serialize)]
pub struct RunResult {
    features: Aggregator<FeatureResult>,
}

impl RunResult {
    pub fn new() -> Self {
        RunResult::default()
    }

    pub fn add_feature(&self, feature: Arc<FeatureResult>) {
        self.features.add_shared(feature);
    }

    pub fn features(&self) -> Iter<'_, FeatureResult> {
        self.features.iter()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn status(&self) -> ExecutionStatus {
        aggregate_status(self.features.iter().map(|f| f.status()))
    }

    pub fn execution_time(&self) -> Option<ExecutionTime> {
        span_of(self.features.iter().filter_map(|f| f.execution_time()))
    }
}

fn span_of(times: impl Iterator<Item = ExecutionTime>) -> Option<ExecutionTime> {
    times.reduce(|acc, t| acc.span(&t))
}

fn count(statuses: impl Iterator<Item = ExecutionStatus>) -> BTreeMap<ExecutionStatus, usize> {
    let mut counts = BTreeMap::new();
    for status in statuses {
        *counts.entry(status).or_insert(0) += 1;
    }
    counts
}
