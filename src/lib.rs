//! # rwsem_stress
//!
//! A concurrency-correctness stress harness for reader/writer locks that support
//! atomic downgrade from exclusive to shared holding.
//!
//! The harness spawns reader, writer and downgrader threads that hammer a lock
//! under sustained contention. Every acquisition and release updates a set of
//! shared atomic counters, and every transition is checked against the lock's
//! mutual-exclusion invariants:
//!
//! - at most one writer holds the lock at any instant
//! - a writer never coexists with readers
//! - a downgrade moves the holder from writer to reader in one indivisible step,
//!   never exposing a window where the lock looks free
//!
//! A run is always bounded: a one-shot timer raises a stop flag after the
//! configured duration, workers exit at their next iteration boundary, and the
//! controller joins them and produces a [`RunReport`](core::RunReport).
//!
//! ## Running a harness
//!
//! ```no_run
//! use rwsem_stress::config::HarnessConfig;
//! use rwsem_stress::core::Controller;
//! use rwsem_stress::rwlock::ParkingLotRwLock;
//!
//! let config = HarnessConfig::new()
//!     .with_readers(4)
//!     .with_writers(2)
//!     .with_downgraders(2)
//!     .with_duration_secs(3);
//!
//! let report = Controller::new(config).run(ParkingLotRwLock::new())?;
//! println!("{report}");
//! assert!(report.passed());
//! # Ok::<(), rwsem_stress::core::HarnessError>(())
//! ```
//!
//! ## Bringing your own lock
//!
//! Any type implementing [`DowngradableLock`](rwlock::DowngradableLock) can be
//! put under test. Holds are guard values; releasing a hold consumes its guard.
//!
//! For complete scenarios, see:
//! - `tests/harness_scenarios_test.rs` - end-to-end runs against each lock
//! - `tests/lock_conformance_test.rs` - behavior of the shipped locks

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Worker loops, invariant checking, shared counters and the test controller.
pub mod core;
/// Harness configuration.
pub mod config;
/// Locks that can be put under test.
pub mod rwlock;
/// Thread spawning for workers and timers.
pub mod runtime;
/// Shared utilities.
pub mod util;
