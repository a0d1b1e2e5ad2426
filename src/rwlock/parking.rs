//! `DowngradableLock` over the `parking_lot` reader-writer lock.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{DowngradableLock, LockState};

/// The `parking_lot` reader-writer lock, guarding no data.
///
/// Downgrade is delegated to [`RwLockWriteGuard::downgrade`], which converts the
/// hold in place. `parking_lot` does not expose its reader count, so shared
/// state is reported without a holder count.
#[derive(Debug, Default)]
pub struct ParkingLotRwLock {
    inner: RwLock<()>,
}

impl ParkingLotRwLock {
    /// Creates a new, unlocked lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(()),
        }
    }
}

impl DowngradableLock for ParkingLotRwLock {
    type SharedGuard<'a> = RwLockReadGuard<'a, ()>;
    type ExclusiveGuard<'a> = RwLockWriteGuard<'a, ()>;

    fn name(&self) -> &'static str {
        "parking_lot"
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
        RwLockWriteGuard::downgrade(guard)
    }

    fn raw_state(&self) -> LockState {
        observe(&self.inner)
    }
}

/// Read the externally visible state of a `parking_lot` lock.
pub(super) fn observe(inner: &RwLock<()>) -> LockState {
    if inner.is_locked_exclusive() {
        LockState::Exclusive
    } else if inner.is_locked() {
        LockState::Shared { holders: None }
    } else {
        LockState::Free
    }
}
