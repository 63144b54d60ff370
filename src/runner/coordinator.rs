use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::info;

use crate::notify::notifier::notify_safely;
use crate::result::result_model::{FeatureInfo, FeatureResult, RunResult, ScenarioResult};
use crate::runner::config::RunnerConfig;
use crate::runner::scenario::Scenario;
use crate::runner::scenario_runner::ScenarioRunner;
use crate::step::error::DeclarationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("run is already finished, feature '{feature}' cannot be started")]
    Finished { feature: String },
}

// ============================================================================
// Feature runner
// ============================================================================

/// Runs the scenarios of one feature and collects their results.
///
/// `run_scenario` takes `&self` and may be called from many threads at
/// once; each call runs its scenario on the calling thread.
pub struct FeatureRunner {
    runner: ScenarioRunner,
    result: Arc<FeatureResult>,
    run: Option<Arc<RunResult>>,
}

impl FeatureRunner {
    /// A feature that is not part of a coordinated run.
    pub fn new(info: FeatureInfo, config: Arc<RunnerConfig>) -> Self {
        FeatureRunner::start(info, config, None)
    }

    fn start(info: FeatureInfo, config: Arc<RunnerConfig>, run: Option<Arc<RunResult>>) -> Self {
        let notifier = Arc::clone(config.notifier());
        notify_safely("feature_started", || notifier.feature_started(&info));
        FeatureRunner {
            runner: ScenarioRunner::new(config),
            result: Arc::new(FeatureResult::new(info)),
            run,
        }
    }

    pub fn info(&self) -> &FeatureInfo {
        self.result.info()
    }

    /// Run a scenario and append its result to the feature.
    pub fn run_scenario(
        &self,
        scenario: Scenario,
    ) -> Result<Arc<ScenarioResult>, DeclarationError> {
        let result = self.runner.run(scenario)?;
        Ok(self.result.add_scenario(result))
    }

    /// Record a scenario as intentionally not executed.
    pub fn skip_scenario(
        &self,
        scenario: Scenario,
        reason: impl Into<String>,
    ) -> Result<Arc<ScenarioResult>, DeclarationError> {
        let result = self.runner.skip(scenario, reason)?;
        Ok(self.result.add_scenario(result))
    }

    /// Results collected so far.
    pub fn result(&self) -> &Arc<FeatureResult> {
        &self.result
    }

    /// Close the feature: notify, and hand the result to the run if any.
    pub fn finish(self) -> Arc<FeatureResult> {
        let notifier = self.runner.config().notifier();
        info!(
            feature = %self.result.info().name,
            scenarios = self.result.scenario_count(),
            status = %self.result.status(),
            "feature finished"
        );
        notify_safely("feature_finished", || notifier.feature_finished(&self.result));
        if let Some(run) = &self.run {
            run.add_feature(Arc::clone(&self.result));
        }
        self.result
    }
}

// ============================================================================
// Run coordinator
// ============================================================================

/// Owns the configuration and the run-level result of one test run.
///
/// Features opened here share the configuration and land in the run result
/// when finished. Once the run is finished, opening another feature fails.
pub struct RunCoordinator {
    config: Arc<RunnerConfig>,
    run: Arc<RunResult>,
    finished: AtomicBool,
}

impl RunCoordinator {
    pub fn new(config: RunnerConfig) -> Self {
        RunCoordinator {
            config: Arc::new(config),
            run: Arc::new(RunResult::new()),
            finished: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Arc<RunnerConfig> {
        &self.config
    }

    pub fn feature(&self, info: FeatureInfo) -> Result<FeatureRunner, CoordinatorError> {
        if self.is_finished() {
            return Err(CoordinatorError::Finished { feature: info.name });
        }
        Ok(FeatureRunner::start(
            info,
            Arc::clone(&self.config),
            Some(Arc::clone(&self.run)),
        ))
    }

    pub fn result(&self) -> &Arc<RunResult> {
        &self.run
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Finish the run. Calling it again is harmless.
    pub fn finish(&self) -> Arc<RunResult> {
        if !self.finished.swap(true, Ordering::AcqRel) {
            info!(features = self.run.feature_count(), status = %self.run.status(), "run finished");
        }
        Arc::clone(&self.run)
    }
}
