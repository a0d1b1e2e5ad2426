//! Reader, writer and downgrader loops.
//!
//! Each loop polls the stop flag once per iteration, never mid critical
//! section. Counter updates nest strictly inside the lock hold: increment after
//! acquiring, decrement before releasing. With a correct lock the holder counts
//! therefore satisfy the invariants at every instant.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::checker::Expect;
use super::context::TestContext;
use crate::rwlock::DowngradableLock;

/// What a spawned thread does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shared acquire/release loop.
    Reader,
    /// Exclusive acquire/release loop.
    Writer,
    /// Exclusive acquire, downgrade, shared release loop.
    Downgrader,
    /// Sampling observer of the shared counters.
    Monitor,
}

impl Role {
    /// Diagnostic label for worker `index` of this role.
    #[must_use]
    pub fn label(self, index: usize) -> String {
        match self {
            Self::Reader => format!("read-{index}"),
            Self::Writer => format!("write-{index}"),
            Self::Downgrader => format!("down-{index}"),
            Self::Monitor => "monitor".to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::Downgrader => "downgrader",
            Self::Monitor => "monitor",
        };
        f.write_str(name)
    }
}

/// What a worker reports when joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerSummary {
    /// Worker role.
    pub role: Role,
    /// Index within the role.
    pub index: usize,
    /// Diagnostic label.
    pub label: String,
    /// Loop iterations completed (samples, for the monitor).
    pub iterations: u64,
    /// Whether the worker ran to completion rather than panicking.
    pub completed: bool,
}

/// Run the loop for `role` until the stop flag is raised.
pub fn run<L: DowngradableLock>(role: Role, ctx: &TestContext<L>, index: usize) -> WorkerSummary {
    let label = role.label(index);
    debug!(worker = %label, "Worker started");

    let iterations = match role {
        Role::Reader => reader_loop(ctx, &label),
        Role::Writer => writer_loop(ctx, &label),
        Role::Downgrader => downgrader_loop(ctx, &label),
        Role::Monitor => super::monitor::sample_loop(ctx, &label),
    };

    debug!(worker = %label, iterations, "Worker done");
    WorkerSummary {
        role,
        index,
        label,
        iterations,
        completed: true,
    }
}

fn reader_loop<L: DowngradableLock>(ctx: &TestContext<L>, label: &str) -> u64 {
    let checker = ctx.checker(label);
    let counters = ctx.counters();
    let mut iterations = 0;

    while !ctx.stop().is_raised() {
        let guard = ctx.lock().acquire_shared();
        let entered = counters.reader_entered();
        counters.record_read();
        checker.check(Expect::NoWriter, entered);

        checker.check(Expect::NoWriter, counters.holders());
        counters.reader_left();
        ctx.lock().release_shared(guard);

        iterations += 1;
        ctx.pause();
    }
    iterations
}

fn writer_loop<L: DowngradableLock>(ctx: &TestContext<L>, label: &str) -> u64 {
    let checker = ctx.checker(label);
    let counters = ctx.counters();
    let mut iterations = 0;

    while !ctx.stop().is_raised() {
        let guard = ctx.lock().acquire_exclusive();
        let entered = counters.writer_entered();
        counters.record_write();
        checker.check(Expect::SoleWriter, entered);

        checker.check(Expect::SoleWriter, counters.holders());
        counters.writer_left();
        ctx.lock().release_exclusive(guard);

        iterations += 1;
        ctx.pause();
    }
    iterations
}

fn downgrader_loop<L: DowngradableLock>(ctx: &TestContext<L>, label: &str) -> u64 {
    let checker = ctx.checker(label);
    let counters = ctx.counters();
    let mut iterations = 0;

    while !ctx.stop().is_raised() {
        let exclusive = ctx.lock().acquire_exclusive();
        let entered = counters.writer_entered();
        counters.record_write();
        checker.check(Expect::SoleWriter, entered);

        // Writer out, reader in: one atomic counter step, then the lock's own.
        let transition = counters.downgrade_holder();
        let shared = ctx.lock().downgrade_exclusive_to_shared(exclusive);
        counters.record_downgrade();
        checker.check_value("writers", 1, transition.before.writers.into());
        checker.check_value("readers", 0, transition.before.readers.into());

        checker.check(Expect::Downgraded, counters.holders());
        counters.reader_left();
        ctx.lock().release_shared(shared);

        iterations += 1;
        ctx.pause();
    }
    iterations
}
