//! Inline invariant checks and the violation log they write to.
//!
//! Checks never block and never stop the calling worker: a failure is logged,
//! counted and (up to a cap) recorded, and the worker carries on. Checks read
//! the shared counters without any extra lock, so they are best-effort by
//! nature.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use super::counters::Holders;

/// Predicates over the live holder counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// A shared holder sees no writer.
    NoWriter,
    /// An exclusive holder is alone.
    SoleWriter,
    /// A downgraded holder sees itself as a reader and no writer.
    Downgraded,
    /// Never more than one writer.
    AtMostOneWriter,
    /// Writers and readers never coexist.
    Exclusive,
    /// Nobody is counted as a holder.
    Free,
}

impl Expect {
    /// Evaluate the predicate.
    #[must_use]
    pub const fn holds(self, h: Holders) -> bool {
        match self {
            Self::NoWriter => h.writers == 0,
            Self::SoleWriter => h.writers == 1 && h.readers == 0,
            Self::Downgraded => h.writers == 0 && h.readers >= 1,
            Self::AtMostOneWriter => h.writers <= 1,
            Self::Exclusive => h.writers == 0 || h.readers == 0,
            Self::Free => h.writers == 0 && h.readers == 0,
        }
    }

    /// Source form of the predicate, for diagnostics.
    #[must_use]
    pub const fn expression(self) -> &'static str {
        match self {
            Self::NoWriter => "writers == 0",
            Self::SoleWriter => "writers == 1 && readers == 0",
            Self::Downgraded => "writers == 0 && readers >= 1",
            Self::AtMostOneWriter => "writers <= 1",
            Self::Exclusive => "writers == 0 || readers == 0",
            Self::Free => "writers == 0 && readers == 0",
        }
    }
}

/// What was found wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationDetail {
    /// A boolean check over the holder counts failed.
    Predicate {
        /// The predicate that failed.
        expression: &'static str,
        /// Readers observed.
        readers: u32,
        /// Writers observed.
        writers: u32,
    },
    /// A counter did not have the expected value.
    ExactValue {
        /// Counter name.
        counter: &'static str,
        /// Expected value.
        expected: u64,
        /// Observed value.
        actual: u64,
    },
    /// A monotonic total went backwards between two observations.
    Regression {
        /// Counter name.
        counter: &'static str,
        /// Earlier observation.
        previous: u64,
        /// Later observation.
        current: u64,
    },
    /// A worker thread panicked.
    Panicked {
        /// Panic payload, if it was a string.
        message: String,
    },
}

/// A recorded invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Label of the worker that detected it.
    pub worker: String,
    /// What was found.
    #[serde(flatten)]
    pub detail: ViolationDetail,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            ViolationDetail::Predicate {
                expression,
                readers,
                writers,
            } => write!(
                f,
                "check `{expression}` failed in {} (readers={readers}, writers={writers})",
                self.worker
            ),
            ViolationDetail::ExactValue {
                counter,
                expected,
                actual,
            } => write!(
                f,
                "check [{counter} != {expected}, == {actual}] failed in {}",
                self.worker
            ),
            ViolationDetail::Regression {
                counter,
                previous,
                current,
            } => write!(
                f,
                "{counter} went backwards ({previous} -> {current}) seen by {}",
                self.worker
            ),
            ViolationDetail::Panicked { message } => {
                write!(f, "{} panicked: {message}", self.worker)
            }
        }
    }
}

/// Thread-safe accumulator of violations.
///
/// The total count is exact; only the first `capacity` records are kept.
#[derive(Debug)]
pub struct ViolationLog {
    count: AtomicU64,
    records: Mutex<Vec<Violation>>,
    capacity: usize,
    truncated: AtomicBool,
}

impl ViolationLog {
    /// Create a log keeping at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            records: Mutex::new(Vec::new()),
            capacity,
            truncated: AtomicBool::new(false),
        }
    }

    /// Record a violation.
    pub fn record(&self, violation: Violation) {
        let seen = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        if seen > self.capacity as u64 {
            self.note_truncated();
            return;
        }
        let mut records = self.records.lock();
        if records.len() < self.capacity {
            warn!(worker = %violation.worker, total = seen, "{violation}");
            records.push(violation);
        } else {
            drop(records);
            self.note_truncated();
        }
    }

    fn note_truncated(&self) {
        if !self.truncated.swap(true, Ordering::Relaxed) {
            warn!(
                capacity = self.capacity,
                "violation log full; further violations are counted but not recorded"
            );
        }
    }

    /// Total violations seen, including unrecorded ones.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Whether some violations were counted but not recorded.
    pub fn truncated(&self) -> bool {
        self.truncated.load(Ordering::Relaxed)
    }

    /// Copy of the recorded violations.
    pub fn records(&self) -> Vec<Violation> {
        self.records.lock().clone()
    }
}

impl Default for ViolationLog {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Per-worker handle for running checks.
#[derive(Debug, Clone, Copy)]
pub struct Checker<'a> {
    worker: &'a str,
    log: &'a ViolationLog,
}

impl<'a> Checker<'a> {
    /// Checker reporting as `worker`.
    #[must_use]
    pub const fn new(worker: &'a str, log: &'a ViolationLog) -> Self {
        Self { worker, log }
    }

    /// Boolean check over a holder snapshot. Returns whether it held.
    pub fn check(&self, expect: Expect, holders: Holders) -> bool {
        if expect.holds(holders) {
            return true;
        }
        self.report(ViolationDetail::Predicate {
            expression: expect.expression(),
            readers: holders.readers,
            writers: holders.writers,
        });
        false
    }

    /// Exact-value check of one counter. Returns whether it matched.
    pub fn check_value(&self, counter: &'static str, expected: u64, actual: u64) -> bool {
        if expected == actual {
            return true;
        }
        self.report(ViolationDetail::ExactValue {
            counter,
            expected,
            actual,
        });
        false
    }

    /// Check that a monotonic total did not go backwards.
    pub fn check_monotonic(&self, counter: &'static str, previous: u64, current: u64) -> bool {
        if current >= previous {
            return true;
        }
        self.report(ViolationDetail::Regression {
            counter,
            previous,
            current,
        });
        false
    }

    /// Record a violation found outside the checks above.
    pub fn report(&self, detail: ViolationDetail) {
        self.log.record(Violation {
            worker: self.worker.to_owned(),
            detail,
        });
    }
}
