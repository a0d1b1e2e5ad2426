//! Shared counters that make lock usage externally observable.
//!
//! The live holder counts share one `AtomicU64`: readers in the low 32 bits,
//! writers in the high 32 bits. Every snapshot of the pair is therefore
//! consistent, and the downgrade transition (one writer out, one reader in) is
//! a single `fetch_add`. The monotonic totals are independent atomics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

const READER_UNIT: u64 = 1;
const WRITER_SHIFT: u32 = 32;
const WRITER_UNIT: u64 = 1 << WRITER_SHIFT;
const READER_MASK: u64 = WRITER_UNIT - 1;
const DOWNGRADE_DELTA: u64 = READER_UNIT.wrapping_sub(WRITER_UNIT);

/// Live holder counts, as one consistent snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Holders {
    /// Threads currently counted as shared holders.
    pub readers: u32,
    /// Threads currently counted as exclusive holders.
    pub writers: u32,
}

impl Holders {
    #[allow(clippy::cast_possible_truncation)]
    const fn unpack(word: u64) -> Self {
        Self {
            readers: (word & READER_MASK) as u32,
            writers: (word >> WRITER_SHIFT) as u32,
        }
    }

    /// No holders of either kind.
    #[must_use]
    pub const fn is_free(self) -> bool {
        self.readers == 0 && self.writers == 0
    }
}

/// Holder counts immediately before and after an atomic transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Counts the transition started from.
    pub before: Holders,
    /// Counts the transition produced.
    pub after: Holders,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Live shared holders.
    pub active_readers: u32,
    /// Live exclusive holders.
    pub active_writers: u32,
    /// Shared acquisitions so far.
    pub reads_taken: u64,
    /// Exclusive acquisitions so far.
    pub writes_taken: u64,
    /// Downgrades so far.
    pub downgrades_taken: u64,
}

/// Counters updated by every worker on every transition.
#[derive(Debug, Default)]
pub struct SharedCounters {
    holders: AtomicU64,
    reads_taken: AtomicU64,
    writes_taken: AtomicU64,
    downgrades_taken: AtomicU64,
}

impl SharedCounters {
    /// Zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            holders: AtomicU64::new(0),
            reads_taken: AtomicU64::new(0),
            writes_taken: AtomicU64::new(0),
            downgrades_taken: AtomicU64::new(0),
        }
    }

    /// Current live holder counts.
    pub fn holders(&self) -> Holders {
        Holders::unpack(self.holders.load(Ordering::SeqCst))
    }

    /// Count one more reader; returns the counts after the change.
    pub fn reader_entered(&self) -> Holders {
        self.apply(READER_UNIT).after
    }

    /// Count one fewer reader; returns the counts after the change.
    pub fn reader_left(&self) -> Holders {
        self.apply(READER_UNIT.wrapping_neg()).after
    }

    /// Count one more writer; returns the counts after the change.
    pub fn writer_entered(&self) -> Holders {
        self.apply(WRITER_UNIT).after
    }

    /// Count one fewer writer; returns the counts after the change.
    pub fn writer_left(&self) -> Holders {
        self.apply(WRITER_UNIT.wrapping_neg()).after
    }

    /// Move one holder from writer to reader in a single atomic step.
    pub fn downgrade_holder(&self) -> Transition {
        self.apply(DOWNGRADE_DELTA)
    }

    /// Bump `reads_taken`.
    pub fn record_read(&self) {
        self.reads_taken.fetch_add(1, Ordering::Relaxed);
    }

    /// Bump `writes_taken`.
    pub fn record_write(&self) {
        self.writes_taken.fetch_add(1, Ordering::Relaxed);
    }

    /// Bump `downgrades_taken`.
    pub fn record_downgrade(&self) {
        self.downgrades_taken.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy every counter. The holder pair is consistent; the totals are not
    /// read atomically with it.
    pub fn snapshot(&self) -> CounterSnapshot {
        let holders = self.holders();
        CounterSnapshot {
            active_readers: holders.readers,
            active_writers: holders.writers,
            reads_taken: self.reads_taken.load(Ordering::Relaxed),
            writes_taken: self.writes_taken.load(Ordering::Relaxed),
            downgrades_taken: self.downgrades_taken.load(Ordering::Relaxed),
        }
    }

    fn apply(&self, delta: u64) -> Transition {
        let prev = self.holders.fetch_add(delta, Ordering::SeqCst);
        Transition {
            before: Holders::unpack(prev),
            after: Holders::unpack(prev.wrapping_add(delta)),
        }
    }
}
