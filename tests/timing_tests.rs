mod common;

use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use common::runner;
use scenario_engine::result::status::ExecutionStatus;
use scenario_engine::runner::config::RunnerConfig;
use scenario_engine::runner::scenario::Scenario;
use scenario_engine::step::step_model::Step;
use scenario_engine::time::clock::Clock;

const STEP_SLEEP: Duration = Duration::from_millis(50);
const CLOCK_SLACK: Duration = Duration::from_millis(5);

// ============================================================================
// Helper builders
// ============================================================================

/// Clock that only moves when told to.
struct ManualClock {
    wall: DateTime<Utc>,
    mono: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(ManualClock {
            wall: Utc::now(),
            mono: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        })
    }

    fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.wall + chrono::Duration::from_std(*self.offset.lock().unwrap()).unwrap()
    }

    fn instant(&self) -> Instant {
        self.mono + *self.offset.lock().unwrap()
    }
}

fn sleeping(template: &str) -> Step {
    Step::new("when", template, || {
        sleep(STEP_SLEEP);
        Ok(())
    })
}

// ============================================================================
// 1. Real clock
// ============================================================================

#[test]
fn sleeping_steps_are_timed() {
    let result = runner(RunnerConfig::default())
        .run(
            Scenario::new("Sleepy")
                .step(sleeping("first"))
                .step(sleeping("second"))
                .step(sleeping("third")),
        )
        .unwrap();

    assert_eq!(result.status(), ExecutionStatus::Passed);
    for step in result.steps() {
        let duration = step.execution_time().unwrap().duration();
        assert!(duration >= STEP_SLEEP, "{:?}", duration);
    }

    let total = result.execution_time().unwrap().duration();
    assert!(total >= STEP_SLEEP * 3, "{:?}", total);
}

#[test]
fn step_windows_do_not_overlap_and_fit_inside_the_scenario() {
    let result = runner(RunnerConfig::default())
        .run(
            Scenario::new("Ordered")
                .step(sleeping("first"))
                .step(sleeping("second"))
                .step(sleeping("third")),
        )
        .unwrap();

    let scenario = result.execution_time().unwrap();
    let windows: Vec<_> = result
        .steps()
        .iter()
        .map(|s| *s.execution_time().unwrap())
        .collect();

    // wall-clock starts and monotonic durations may disagree by a hair
    let slack = chrono::Duration::from_std(CLOCK_SLACK).unwrap();
    assert!(scenario.start() <= windows[0].start());
    for pair in windows.windows(2) {
        assert!(pair[0].end() <= pair[1].start() + slack);
    }
    assert!(scenario.end() + slack >= windows[2].end());
}

// ============================================================================
// 2. Injected clock
// ============================================================================

#[test]
fn injected_clock_drives_every_measurement() {
    let clock = ManualClock::new();
    let (c1, c2) = (Arc::clone(&clock), Arc::clone(&clock));

    let result = runner(RunnerConfig::new().with_clock(clock.clone()))
        .run(
            Scenario::new("Manual")
                .step(Step::new("given", "one second", move || {
                    c1.advance(Duration::from_secs(1));
                    Ok(())
                }))
                .step(Step::new("when", "two seconds then failure", move || {
                    c2.advance(Duration::from_secs(2));
                    anyhow::bail!("late")
                }))
                .step(Step::new("then", "never", || Ok(()))),
        )
        .unwrap();

    let steps = result.steps();
    assert_eq!(steps[0].execution_time().unwrap().duration(), Duration::from_secs(1));
    assert_eq!(steps[1].execution_time().unwrap().duration(), Duration::from_secs(2));
    assert!(steps[2].execution_time().is_none());
    assert_eq!(
        steps[1].execution_time().unwrap().start(),
        steps[0].execution_time().unwrap().end()
    );
    assert_eq!(result.execution_time().unwrap().duration(), Duration::from_secs(3));
}

#[test]
fn skipped_scenario_has_zero_duration() {
    let clock = ManualClock::new();
    let result = runner(RunnerConfig::new().with_clock(clock.clone()))
        .skip(
            Scenario::new("Later").step(Step::new("given", "x", || Ok(()))),
            "later",
        )
        .unwrap();
    let time = result.execution_time().unwrap();
    assert_eq!(time.duration(), Duration::ZERO);
    assert_eq!(time.start(), clock.now());
}
