//! Reader-writer locks with atomic downgrade.
//!
//! This module defines the contract the harness drives ([`DowngradableLock`])
//! and ships three implementations of it:
//!
//! - [`ParkingLotRwLock`] - the `parking_lot` reader-writer lock
//! - [`CountingRwLock`] - a reference lock built on `Mutex` + `Condvar` that
//!   tracks its exact holder count
//! - [`SplitDowngradeLock`] - a deliberately broken lock whose downgrade
//!   releases and re-acquires, used to prove the checker catches it
//!
//! # Examples
//!
//! ```
//! use rwsem_stress::rwlock::{DowngradableLock, LockState, ParkingLotRwLock};
//!
//! let lock = ParkingLotRwLock::new();
//!
//! let w = lock.acquire_exclusive();
//! assert_eq!(lock.raw_state(), LockState::Exclusive);
//!
//! // Downgrade keeps the lock held the whole time
//! let r = lock.downgrade_exclusive_to_shared(w);
//! assert!(matches!(lock.raw_state(), LockState::Shared { .. }));
//!
//! lock.release_shared(r);
//! assert_eq!(lock.raw_state(), LockState::Free);
//! ```

mod counting;
mod parking;
mod split;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use counting::{CountingReadGuard, CountingRwLock, CountingWriteGuard};
pub use parking::ParkingLotRwLock;
pub use split::SplitDowngradeLock;

/// A shared/exclusive lock that can atomically downgrade an exclusive hold to a
/// shared one.
///
/// Holds are represented by guards. Dropping a guard releases the hold; the
/// `release_*` methods exist so callers can name the transition explicitly.
///
/// Implementations must guarantee that
/// [`downgrade_exclusive_to_shared`](Self::downgrade_exclusive_to_shared) never
/// lets the lock appear free between the exclusive release and the shared
/// acquire it stands for. Any failure to do so is exactly what the harness is
/// built to catch.
pub trait DowngradableLock: Send + Sync + 'static {
    /// Guard for a shared hold.
    type SharedGuard<'a>
    where
        Self: 'a;

    /// Guard for an exclusive hold.
    type ExclusiveGuard<'a>
    where
        Self: 'a;

    /// Short name used in reports.
    fn name(&self) -> &'static str;

    /// Block until a shared hold is granted.
    fn acquire_shared(&self) -> Self::SharedGuard<'_>;

    /// Block until an exclusive hold is granted.
    fn acquire_exclusive(&self) -> Self::ExclusiveGuard<'_>;

    /// Convert an exclusive hold into a shared hold without passing through `Free`.
    fn downgrade_exclusive_to_shared<'a>(
        &'a self,
        guard: Self::ExclusiveGuard<'a>,
    ) -> Self::SharedGuard<'a>;

    /// Release a shared hold.
    fn release_shared(&self, guard: Self::SharedGuard<'_>) {
        drop(guard);
    }

    /// Release an exclusive hold.
    fn release_exclusive(&self, guard: Self::ExclusiveGuard<'_>) {
        drop(guard);
    }

    /// Raw internal state, for diagnosing discrepancies in the final report.
    fn raw_state(&self) -> LockState;
}

/// Internal state of a lock as reported by the lock itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockState {
    /// Nobody holds the lock.
    Free,
    /// One or more shared holders.
    Shared {
        /// Exact holder count, when the lock can report it.
        holders: Option<usize>,
    },
    /// A single exclusive holder.
    Exclusive,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Shared { holders: Some(n) } => write!(f, "shared({n})"),
            Self::Shared { holders: None } => write!(f, "shared(?)"),
            Self::Exclusive => write!(f, "exclusive"),
        }
    }
}

/// Lock implementation selection for configured runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LockKind {
    /// [`ParkingLotRwLock`].
    #[default]
    #[value(alias = "parking_lot")]
    ParkingLot,
    /// [`CountingRwLock`].
    Counting,
    /// [`SplitDowngradeLock`].
    #[value(alias = "split_downgrade")]
    SplitDowngrade,
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ParkingLot => "parking_lot",
            Self::Counting => "counting",
            Self::SplitDowngrade => "split_downgrade",
        };
        f.write_str(name)
    }
}
