use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::step::error::{StepBypassed, StepIgnored};

/// Outcome of a step, scenario or feature.
///
/// Variants are declared in severity order, so `Ord` ranks
/// `Failed > Ignored > Bypassed > Passed > NotRun`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    NotRun,
    Passed,
    Bypassed,
    Ignored,
    Failed,
}

impl ExecutionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionStatus::NotRun => "NotRun",
            ExecutionStatus::Passed => "Passed",
            ExecutionStatus::Bypassed => "Bypassed",
            ExecutionStatus::Ignored => "Ignored",
            ExecutionStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Combine child statuses into the parent's status.
///
/// The worst status wins. When nothing was executed but something was
/// declared, the parent is `Bypassed`. No children at all means `Passed`.
pub fn aggregate_status<I>(statuses: I) -> ExecutionStatus
where
    I: IntoIterator<Item = ExecutionStatus>,
{
    match statuses.into_iter().max() {
        None => ExecutionStatus::Passed,
        Some(ExecutionStatus::NotRun) => ExecutionStatus::Bypassed,
        Some(worst) => worst,
    }
}

// ============================================================================
// Failure classification
// ============================================================================

/// Classification function applied to step failures.
pub type FailureClassifier = Arc<dyn Fn(&anyhow::Error) -> ExecutionStatus + Send + Sync>;

/// Maps the outcome of a step to its status.
#[derive(Clone)]
pub struct StatusResolver {
    classify: FailureClassifier,
}

impl StatusResolver {
    pub fn new<F>(classify: F) -> Self
    where
        F: Fn(&anyhow::Error) -> ExecutionStatus + Send + Sync + 'static,
    {
        StatusResolver {
            classify: Arc::new(classify),
        }
    }

    /// Resolver that understands [`StepIgnored`] and [`StepBypassed`].
    pub fn with_signals() -> Self {
        StatusResolver::new(classify_signals)
    }

    /// `None` is a clean return. A classifier answer of `NotRun` is recorded
    /// as `Failed`: an executed step always carries a status with a time.
    pub fn resolve(&self, failure: Option<&anyhow::Error>) -> ExecutionStatus {
        match failure {
            None => ExecutionStatus::Passed,
            Some(err) => match (self.classify)(err) {
                ExecutionStatus::NotRun => {
                    tracing::warn!(error = %err, "failure classified as NotRun, recording Failed");
                    ExecutionStatus::Failed
                }
                status => status,
            },
        }
    }
}

impl Default for StatusResolver {
    /// Every failure is `Failed`.
    fn default() -> Self {
        StatusResolver::new(|_| ExecutionStatus::Failed)
    }
}

impl fmt::Debug for StatusResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusResolver").finish_non_exhaustive()
    }
}

/// `StepIgnored` -> `Ignored`, `StepBypassed` -> `Bypassed`, anything else
/// -> `Failed`. The signal may sit anywhere in the error's context chain.
pub fn classify_signals(err: &anyhow::Error) -> ExecutionStatus {
    for cause in err.chain() {
        if cause.is::<StepIgnored>() {
            return ExecutionStatus::Ignored;
        }
        if cause.is::<StepBypassed>() {
            return ExecutionStatus::Bypassed;
        }
    }
    ExecutionStatus::Failed
}
