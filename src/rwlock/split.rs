//! A lock whose downgrade is not atomic.
//!
//! Downgrade here releases the exclusive hold, yields, then acquires a shared
//! hold. Between the two a writer can slip in while the downgrading thread
//! still believes it holds the lock. Running the harness against this lock must
//! produce invariant violations; if it does not, the checker is blind.

use std::thread;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::parking::observe;
use super::{DowngradableLock, LockState};

/// `parking_lot` lock with a broken, two-step downgrade.
#[derive(Debug, Default)]
pub struct SplitDowngradeLock {
    inner: RwLock<()>,
}

impl SplitDowngradeLock {
    /// Creates a new, unlocked lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(()),
        }
    }
}

impl DowngradableLock for SplitDowngradeLock {
    type SharedGuard<'a> = RwLockReadGuard<'a, ()>;
    type ExclusiveGuard<'a> = RwLockWriteGuard<'a, ()>;

    fn name(&self) -> &'static str {
        "split_downgrade"
    }

    fn acquire_shared(&self) -> Self::SharedGuard<'_> {
        self.inner.read()
    }

    fn acquire_exclusive(&self) -> Self::ExclusiveGuard<'_> {
        self.inner.write()
    }

    fn downgrade_exclusive_to_shared<'a>(
        &'a self,
        guard: Self::ExclusiveGuard<'a>,
    ) -> Self::SharedGuard<'a> {
        drop(guard);
        // Widen the free window.
        thread::yield_now();
        self.inner.read()
    }

    fn raw_state(&self) -> LockState {
        observe(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downgrade_ends_shared() {
        let lock = SplitDowngradeLock::new();

        let w = lock.acquire_exclusive();
        let r = lock.downgrade_exclusive_to_shared(w);
        assert_eq!(lock.raw_state(), LockState::Shared { holders: None });

        lock.release_shared(r);
        assert_eq!(lock.raw_state(), LockState::Free);
    }
}
