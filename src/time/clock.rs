use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::time::execution_time::ExecutionTime;

/// Source of timestamps for everything the runner measures.
///
/// `now` gives the wall-clock instant that is recorded as a start time,
/// `instant` gives the monotonic reading used to measure elapsed time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// A running measurement started from a [`Clock`].
///
/// The start is captured as a wall-clock instant while the duration is
/// taken from the monotonic clock, so a stopped watch never reports a
/// negative duration even if the wall clock jumps.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: DateTime<Utc>,
    started: Instant,
}

impl Stopwatch {
    pub fn start(clock: &dyn Clock) -> Self {
        Stopwatch {
            started: clock.instant(),
            start: clock.now(),
        }
    }

    /// Wall-clock instant the watch was started at.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.start
    }

    /// Stop the measurement. The watch can be stopped more than once;
    /// every call measures from the same start.
    pub fn stop(&self, clock: &dyn Clock) -> ExecutionTime {
        let elapsed = clock.instant().saturating_duration_since(self.started);
        ExecutionTime::new(self.start, elapsed)
    }
}
