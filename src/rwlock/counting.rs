//! Reference reader-writer lock built from a `Mutex` and two `Condvar`s.
//!
//! The lock word is an explicit reader count plus a writer flag, so the final
//! report can show the exact number of holders. Waiting writers block newly
//! arriving readers, and a writer leaving the lock hands it to the readers
//! already waiting, so neither side starves the other.

use std::mem;

use parking_lot::{Condvar, Mutex};

use super::{DowngradableLock, LockState};

#[derive(Debug, Default)]
struct LockWord {
    readers: usize,
    writer: bool,
    waiting_writers: usize,
    waiting_readers: usize,
    /// Waiting readers go ahead of waiting writers until all are admitted.
    readers_turn: bool,
}

/// Reader-writer lock with an observable holder count.
#[derive(Debug, Default)]
pub struct CountingRwLock {
    word: Mutex<LockWord>,
    readable: Condvar,
    writable: Condvar,
}

/// Shared hold on a [`CountingRwLock`]. Released on drop.
#[must_use = "if unused the shared hold is released immediately"]
#[derive(Debug)]
pub struct CountingReadGuard<'a> {
    lock: &'a CountingRwLock,
}

/// Exclusive hold on a [`CountingRwLock`]. Released on drop.
#[must_use = "if unused the exclusive hold is released immediately"]
#[derive(Debug)]
pub struct CountingWriteGuard<'a> {
    lock: &'a CountingRwLock,
}

impl CountingRwLock {
    /// Creates a new, unlocked lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            word: Mutex::new(LockWord {
                readers: 0,
                writer: false,
                waiting_writers: 0,
                waiting_readers: 0,
                readers_turn: false,
            }),
            readable: Condvar::new(),
            writable: Condvar::new(),
        }
    }

    /// Current number of shared holders.
    #[must_use]
    pub fn readers(&self) -> usize {
        self.word.lock().readers
    }

    fn lock_shared(&self) {
        let mut word = self.word.lock();
        word.waiting_readers += 1;
        while word.writer || (word.waiting_writers > 0 && !word.readers_turn) {
            self.readable.wait(&mut word);
        }
        word.waiting_readers -= 1;
        word.readers += 1;
        if word.waiting_readers == 0 {
            word.readers_turn = false;
        }
    }

    fn unlock_shared(&self) {
        let mut word = self.word.lock();
        word.readers -= 1;
        if word.readers == 0 {
            self.writable.notify_one();
        }
    }

    fn lock_exclusive(&self) {
        let mut word = self.word.lock();
        word.waiting_writers += 1;
        while word.writer || word.readers > 0 || word.readers_turn {
            self.writable.wait(&mut word);
        }
        word.waiting_writers -= 1;
        word.writer = true;
    }

    fn unlock_exclusive(&self) {
        let mut word = self.word.lock();
        word.writer = false;
        if word.waiting_readers > 0 {
            word.readers_turn = true;
            self.readable.notify_all();
        } else if word.waiting_writers > 0 {
            self.writable.notify_one();
        }
    }

    /// Writer flag and reader count change under one hold of the word mutex.
    fn downgrade(&self) {
        let mut word = self.word.lock();
        word.writer = false;
        word.readers = 1;
        if word.waiting_readers > 0 {
            word.readers_turn = true;
            self.readable.notify_all();
        }
    }
}

impl Drop for CountingReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock_shared();
    }
}

impl Drop for CountingWriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock_exclusive();
    }
}

impl DowngradableLock for CountingRwLock {
    type SharedGuard<'a> = CountingReadGuard<'a>;
    type ExclusiveGuard<'a> = CountingWriteGuard<'a>;

    fn name(&self) -> &'static str {
        "counting"
    }

    fn acquire_shared(&self) -> Self::SharedGuard<'_> {
        self.lock_shared();
        CountingReadGuard { lock: self }
    }

    fn acquire_exclusive(&self) -> Self::ExclusiveGuard<'_> {
        self.lock_exclusive();
        CountingWriteGuard { lock: self }
    }

    fn downgrade_exclusive_to_shared<'a>(
        &'a self,
        guard: Self::ExclusiveGuard<'a>,
    ) -> Self::SharedGuard<'a> {
        let lock = guard.lock;
        // The exclusive hold is converted, not released.
        mem::forget(guard);
        lock.downgrade();
        CountingReadGuard { lock }
    }

    fn raw_state(&self) -> LockState {
        let word = self.word.lock();
        if word.writer {
            LockState::Exclusive
        } else if word.readers > 0 {
            LockState::Shared {
                holders: Some(word.readers),
            }
        } else {
            LockState::Free
        }
    }
}
