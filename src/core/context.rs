//! Per-run shared state handed to every worker.

use std::thread;

use super::checker::{Checker, ViolationLog};
use super::counters::SharedCounters;
use super::timer::StopFlag;
use crate::rwlock::DowngradableLock;

/// Everything the workers of one run share.
///
/// Owned by the controller for the run's lifetime and handed to workers behind
/// an `Arc`; nothing outlives the run.
#[derive(Debug)]
pub struct TestContext<L> {
    lock: L,
    counters: SharedCounters,
    stop: StopFlag,
    violations: ViolationLog,
    cooperative_yield: bool,
}

impl<L: DowngradableLock> TestContext<L> {
    /// Fresh context around `lock` with zeroed counters and a cleared stop flag.
    pub fn new(lock: L, cooperative_yield: bool, max_recorded_violations: usize) -> Self {
        Self {
            lock,
            counters: SharedCounters::new(),
            stop: StopFlag::new(),
            violations: ViolationLog::new(max_recorded_violations),
            cooperative_yield,
        }
    }

    /// The lock under test.
    pub const fn lock(&self) -> &L {
        &self.lock
    }

    /// Shared counters.
    pub const fn counters(&self) -> &SharedCounters {
        &self.counters
    }

    /// Stop flag.
    pub const fn stop(&self) -> &StopFlag {
        &self.stop
    }

    /// Violations recorded so far.
    pub const fn violations(&self) -> &ViolationLog {
        &self.violations
    }

    /// Checker reporting as `worker`.
    pub const fn checker<'a>(&'a self, worker: &'a str) -> Checker<'a> {
        Checker::new(worker, &self.violations)
    }

    /// End-of-iteration scheduling hint.
    pub fn pause(&self) {
        if self.cooperative_yield {
            thread::yield_now();
        }
    }
}
