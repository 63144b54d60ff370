use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, info};

use crate::format::name_formatter::format_step_name;
use crate::notify::notifier::notify_safely;
use crate::result::result_model::{ScenarioResult, StepInfo, StepResult};
use crate::result::status::ExecutionStatus;
use crate::runner::config::RunnerConfig;
use crate::runner::scenario::Scenario;
use crate::step::context::StepContext;
use crate::step::error::{DeclarationError, StepPanicked};
use crate::step::step_model::{Invocation, Step};
use crate::time::clock::Stopwatch;
use crate::time::execution_time::ExecutionTime;

/// Executes the steps of one scenario, in order, on the calling thread.
///
/// A runner holds no per-scenario state, so one runner can be shared by
/// any number of threads running different scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: Arc<RunnerConfig>,
}

impl ScenarioRunner {
    pub fn new(config: Arc<RunnerConfig>) -> Self {
        ScenarioRunner { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run a scenario to completion.
    ///
    /// A malformed declaration is returned as an error before anything
    /// runs. Step failures never surface here: they are recorded in the
    /// returned result.
    pub fn run(&self, scenario: Scenario) -> Result<ScenarioResult, DeclarationError> {
        scenario.validate()?;
        let (info, steps) = scenario.into_parts();
        let clock = self.config.clock();
        let notifier = self.config.notifier();

        notify_safely("scenario_started", || notifier.scenario_started(&info));
        let stopwatch = Stopwatch::start(clock);

        let keywords = display_keywords(&steps, self.config.repeated_keyword());
        let mut results = self.declare_results(&steps, &keywords);

        let mut halted_at: Option<usize> = None;
        for (index, step) in steps.into_iter().enumerate() {
            if let Some(at) = halted_at {
                debug!(scenario = %info.name, step = index + 1, halted_at = at, "step not run");
                continue;
            }
            let status = self.run_step(step, &mut results[index], &keywords[index]);
            if self.halts(status) {
                halted_at = Some(index + 1);
            }
        }

        let execution_time = if results.is_empty() {
            ExecutionTime::instant(stopwatch.started_at())
        } else {
            stopwatch.stop(clock)
        };
        let mut result = ScenarioResult::new(info, results);
        result.finish(execution_time);

        info!(
            scenario = %result.name(),
            status = %result.status(),
            elapsed_ms = execution_time.duration().as_millis() as u64,
            "scenario finished"
        );
        notify_safely("scenario_finished", || notifier.scenario_finished(&result));
        Ok(result)
    }

    /// Record a scenario as declared but intentionally not executed.
    ///
    /// Every step stays `NotRun` and the scenario is `Bypassed` with
    /// `reason` as its details.
    pub fn skip(
        &self,
        scenario: Scenario,
        reason: impl Into<String>,
    ) -> Result<ScenarioResult, DeclarationError> {
        scenario.validate()?;
        let (info, steps) = scenario.into_parts();
        let notifier = self.config.notifier();

        notify_safely("scenario_started", || notifier.scenario_started(&info));
        let keywords = display_keywords(&steps, self.config.repeated_keyword());
        let results = self.declare_results(&steps, &keywords);

        let mut result = ScenarioResult::new(info, results);
        result.finish_bypassed(
            ExecutionTime::instant(self.config.clock().now()),
            reason.into(),
        );
        info!(scenario = %result.name(), "scenario bypassed");
        notify_safely("scenario_finished", || notifier.scenario_finished(&result));
        Ok(result)
    }

    /// First pass: every step as `NotRun`, named with the values known so far.
    fn declare_results(&self, steps: &[Step], keywords: &[String]) -> Vec<StepResult> {
        let total = steps.len();
        steps
            .iter()
            .zip(keywords)
            .enumerate()
            .map(|(index, (step, keyword))| {
                let parameters = step.declared_parameters();
                let description = self
                    .config
                    .name_formatter()
                    .format_name(step.template(), parameters.as_slice());
                let info = StepInfo {
                    number: index + 1,
                    total,
                    keyword: step.keyword().to_string(),
                    template: step.template().to_string(),
                    parameters,
                };
                StepResult::not_run(info, format_step_name(keyword, &description))
            })
            .collect()
    }

    fn run_step(&self, step: Step, result: &mut StepResult, keyword: &str) -> ExecutionStatus {
        let clock = self.config.clock();
        let notifier = self.config.notifier();
        let stopwatch = Stopwatch::start(clock);

        let mut comments = Vec::new();
        let outcome = match guarded(|| step.into_invocation()) {
            Err(err) => {
                debug!(step = result.number(), error = %err, "argument resolution failed");
                Err(err)
            }
            Ok(Invocation { values, body }) => {
                let mut parameters = result.info().parameters.clone();
                parameters.bind(values);
                let description = self
                    .config
                    .name_formatter()
                    .format_name(&result.info().template, parameters.as_slice());
                result.set_resolved_name(parameters, format_step_name(keyword, &description));

                debug!(step = result.number(), name = %result.formatted_name(), "step started");
                notify_safely("step_started", || notifier.step_started(result));

                let mut ctx = StepContext::new(result.info().clone(), Arc::clone(notifier));
                let ran = guarded(|| body(&mut ctx));
                comments = ctx.into_comments();
                ran
            }
        };

        let execution_time = stopwatch.stop(clock);
        let status = self.config.status_resolver().resolve(outcome.as_ref().err());
        let details = outcome.err().map(|err| format!("{:#}", err));
        result.finish(status, details, execution_time, comments);

        debug!(
            step = result.number(),
            status = %status,
            elapsed_ms = execution_time.duration().as_millis() as u64,
            "step finished"
        );
        notify_safely("step_finished", || notifier.step_finished(result));
        status
    }

    fn halts(&self, status: ExecutionStatus) -> bool {
        match status {
            ExecutionStatus::Failed => true,
            ExecutionStatus::Ignored => self.config.stop_on_ignored(),
            _ => false,
        }
    }
}

/// Run `call`, turning a panic into a [`StepPanicked`] error.
fn guarded<T>(call: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(StepPanicked::from_payload(&*payload).into()),
    }
}

/// Keywords as they appear in step names, with repeats replaced when
/// configured.
fn display_keywords(steps: &[Step], repeated: Option<&str>) -> Vec<String> {
    let mut previous: Option<&str> = None;
    steps
        .iter()
        .map(|step| {
            let keyword = step.keyword().trim();
            let shown = match (repeated, previous) {
                (Some(replacement), Some(prev))
                    if !keyword.is_empty() && keyword.eq_ignore_ascii_case(prev) =>
                {
                    replacement.to_string()
                }
                _ => keyword.to_string(),
            };
            previous = Some(keyword);
            shown
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(keyword: &str) -> Step {
        Step::new(keyword, "something happens", || Ok(()))
    }

    #[test]
    fn repeated_keywords_are_replaced_when_configured() {
        let steps = vec![noop("given"), noop("Given"), noop("when"), noop("then"), noop("then")];
        assert_eq!(
            display_keywords(&steps, Some("and")),
            vec!["given", "and", "when", "then", "and"]
        );
        assert_eq!(
            display_keywords(&steps, None),
            vec!["given", "Given", "when", "then", "then"]
        );
    }

    #[test]
    fn guarded_turns_panics_into_errors() {
        let err = guarded::<()>(|| panic!("kaboom")).unwrap_err();
        let panicked = err.downcast_ref::<StepPanicked>().unwrap();
        assert_eq!(panicked.message, "kaboom");
    }
}
