use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Start instant and duration of a timed entity (step, scenario, run).
///
/// The end instant is always derived from the two stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTime {
    start: DateTime<Utc>,
    duration: Duration,
}

impl ExecutionTime {
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        ExecutionTime { start, duration }
    }

    /// A zero-length time at `start`.
    pub fn instant(start: DateTime<Utc>) -> Self {
        ExecutionTime::new(start, Duration::ZERO)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn end(&self) -> DateTime<Utc> {
        match chrono::Duration::from_std(self.duration) {
            Ok(d) => self.start.checked_add_signed(d).unwrap_or(DateTime::<Utc>::MAX_UTC),
            Err(_) => DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Smallest time covering both `self` and `other`.
    pub fn span(&self, other: &ExecutionTime) -> ExecutionTime {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        let duration = (end - start).to_std().unwrap_or(Duration::ZERO);
        ExecutionTime::new(start, duration)
    }
}

impl fmt::Display for ExecutionTime {
    /// `12:00:01.250 + 50ms -> 12:00:01.300`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} + {} -> {}",
            self.start.format("%H:%M:%S%.3f"),
            format_duration(self.duration),
            self.end().format("%H:%M:%S%.3f")
        )
    }
}

/// Compact human-readable duration: `850ms`, `1.250s`, `2m 03s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.3}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
