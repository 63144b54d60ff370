use std::fmt;
use std::sync::Arc;

use crate::format::name_formatter::{DefaultNameFormatter, NameFormatter};
use crate::notify::notifier::{NoProgressNotifier, ProgressNotifier};
use crate::result::status::{ExecutionStatus, StatusResolver};
use crate::time::clock::{Clock, SystemClock};

/// Collaborators and switches shared by every scenario of a run.
#[derive(Clone)]
pub struct RunnerConfig {
    status_resolver: StatusResolver,
    name_formatter: Arc<dyn NameFormatter>,
    notifier: Arc<dyn ProgressNotifier>,
    clock: Arc<dyn Clock>,
    stop_on_ignored: bool,
    repeated_keyword: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            status_resolver: StatusResolver::default(),
            name_formatter: Arc::new(DefaultNameFormatter),
            notifier: Arc::new(NoProgressNotifier),
            clock: Arc::new(SystemClock),
            stop_on_ignored: false,
            repeated_keyword: None,
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_resolver(mut self, resolver: StatusResolver) -> Self {
        self.status_resolver = resolver;
        self
    }

    /// Shorthand for `with_status_resolver(StatusResolver::new(classify))`.
    pub fn with_failure_classifier<F>(self, classify: F) -> Self
    where
        F: Fn(&anyhow::Error) -> ExecutionStatus + Send + Sync + 'static,
    {
        self.with_status_resolver(StatusResolver::new(classify))
    }

    pub fn with_name_formatter(mut self, formatter: Arc<dyn NameFormatter>) -> Self {
        self.name_formatter = formatter;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ProgressNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Whether an ignored step halts the rest of its scenario. Off by
    /// default; a failed step always halts.
    pub fn with_stop_on_ignored(mut self, stop: bool) -> Self {
        self.stop_on_ignored = stop;
        self
    }

    /// Replace a step keyword that repeats the previous step's keyword,
    /// e.g. `THEN a` / `THEN b` becomes `THEN a` / `AND b`.
    pub fn with_repeated_keyword(mut self, replacement: Option<String>) -> Self {
        self.repeated_keyword = replacement.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn status_resolver(&self) -> &StatusResolver {
        &self.status_resolver
    }

    pub fn name_formatter(&self) -> &dyn NameFormatter {
        self.name_formatter.as_ref()
    }

    pub fn notifier(&self) -> &Arc<dyn ProgressNotifier> {
        &self.notifier
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn stop_on_ignored(&self) -> bool {
        self.stop_on_ignored
    }

    pub fn repeated_keyword(&self) -> Option<&str> {
        self.repeated_keyword.as_deref()
    }
}

impl fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("stop_on_ignored", &self.stop_on_ignored)
            .field("repeated_keyword", &self.repeated_keyword)
            .finish_non_exhaustive()
    }
}
