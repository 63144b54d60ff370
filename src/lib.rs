//! Scenario-based acceptance test runner.
//!
//! Scenarios are ordered lists of [`step::step_model::Step`]s. A
//! [`runner::scenario_runner::ScenarioRunner`] executes them one by one,
//! capturing argument values when each step starts, rendering human-readable
//! step names, timing every step and reporting progress to a
//! [`notify::notifier::ProgressNotifier`]. Results accumulate in
//! thread-safe aggregators so scenarios of one feature may run in parallel.

pub mod cli;
pub mod demo;
pub mod format;
pub mod notify;
pub mod report;
pub mod result;
pub mod runner;
pub mod step;
pub mod time;
