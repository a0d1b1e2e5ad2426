//! Sampling observer of the shared counters.
//!
//! The monitor takes no lock. It reads the packed holder word, which is always
//! a consistent pair, and the totals, checking the holder invariants on every
//! sample and monotonicity of the totals between consecutive samples.

use std::thread;

use super::checker::Expect;
use super::context::TestContext;
use super::counters::CounterSnapshot;
use crate::rwlock::DowngradableLock;

/// Sample until the stop flag is raised; returns the number of samples taken.
pub(super) fn sample_loop<L: DowngradableLock>(ctx: &TestContext<L>, label: &str) -> u64 {
    let checker = ctx.checker(label);
    let mut previous = CounterSnapshot::default();
    let mut samples = 0;

    while !ctx.stop().is_raised() {
        let holders = ctx.counters().holders();
        checker.check(Expect::AtMostOneWriter, holders);
        checker.check(Expect::Exclusive, holders);

        let current = ctx.counters().snapshot();
        checker.check_monotonic("reads_taken", previous.reads_taken, current.reads_taken);
        checker.check_monotonic("writes_taken", previous.writes_taken, current.writes_taken);
        checker.check_monotonic(
            "downgrades_taken",
            previous.downgrades_taken,
            current.downgrades_taken,
        );
        previous = current;

        samples += 1;
        thread::yield_now();
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::worker::{self, Role};
    use crate::rwlock::ParkingLotRwLock;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_monitor_flags_coexisting_holders() {
        let ctx = Arc::new(TestContext::new(ParkingLotRwLock::new(), false, 16));
        ctx.counters().reader_entered();
        ctx.counters().writer_entered();

        let monitor_ctx = Arc::clone(&ctx);
        let handle = thread::spawn(move || worker::run(Role::Monitor, &monitor_ctx, 0));
        while ctx.violations().count() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        ctx.stop().raise();

        let summary = handle.join().unwrap();
        assert!(summary.iterations > 0);
        let records = ctx.violations().records();
        assert_eq!(records[0].worker, "monitor");
    }

    #[test]
    fn test_monitor_quiet_on_idle_counters() {
        let ctx = Arc::new(TestContext::new(ParkingLotRwLock::new(), false, 16));

        let monitor_ctx = Arc::clone(&ctx);
        let handle = thread::spawn(move || worker::run(Role::Monitor, &monitor_ctx, 0));
        thread::sleep(Duration::from_millis(20));
        ctx.stop().raise();

        let summary = handle.join().unwrap();
        assert!(summary.iterations > 0);
        assert_eq!(ctx.violations().count(), 0);
    }
}
