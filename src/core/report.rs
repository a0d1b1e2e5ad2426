//! End-of-run report.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::checker::Violation;
use super::counters::CounterSnapshot;
use super::worker::WorkerSummary;
use crate::rwlock::LockState;

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// No violations were seen.
    Passed,
    /// At least one violation was seen.
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => f.write_str("PASSED"),
            Self::Failed => f.write_str("FAILED"),
        }
    }
}

/// Aggregated results of one bounded run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Name of the lock under test.
    pub lock: String,
    /// Wall-clock start, ms since the Unix epoch.
    pub started_at_ms: u128,
    /// Configured run duration in seconds.
    pub duration_secs: u64,
    /// Measured time from first spawn to last join, in ms.
    pub elapsed_ms: u128,
    /// Logical CPUs on the host.
    pub cpus: usize,
    /// Whether the stop timer fired (as opposed to all workers exiting early).
    pub timer_fired: bool,
    /// Final counter values.
    pub counters: CounterSnapshot,
    /// Raw internal state of the lock after the run.
    pub lock_state: LockState,
    /// Total violations seen.
    pub violation_count: u64,
    /// Recorded violations (possibly fewer than `violation_count`).
    pub violations: Vec<Violation>,
    /// Per-worker results, in spawn order.
    pub workers: Vec<WorkerSummary>,
    /// Overall verdict.
    pub outcome: Outcome,
}

impl RunReport {
    /// Whether the run saw no violations.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error, which does not happen for this type in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rwsem stress run {} (lock={}, {}s, {} cpus)",
            self.run_id, self.lock, self.duration_secs, self.cpus
        )?;
        writeln!(f, "rwsem state = {}", self.lock_state)?;
        writeln!(f, "reads taken: {}", self.counters.reads_taken)?;
        writeln!(f, "writes taken: {}", self.counters.writes_taken)?;
        writeln!(f, "downgrades taken: {}", self.counters.downgrades_taken)?;
        writeln!(
            f,
            "holders at exit: readers={} writers={}",
            self.counters.active_readers, self.counters.active_writers
        )?;

        writeln!(f, "violations: {}", self.violation_count)?;
        for violation in &self.violations {
            writeln!(f, "  {violation}")?;
        }
        let unrecorded = self.violation_count.saturating_sub(self.violations.len() as u64);
        if unrecorded > 0 {
            writeln!(f, "  ... and {unrecorded} more")?;
        }

        for worker in &self.workers {
            let status = if worker.completed { "done" } else { "panicked" };
            writeln!(f, "{}: {} iterations, {status}", worker.label, worker.iterations)?;
        }
        write!(f, "elapsed: {}ms\nresult: {}", self.elapsed_ms, self.outcome)
    }
}
