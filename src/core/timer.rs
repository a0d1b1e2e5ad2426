//! Stop flag and the one-shot timer that raises it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use super::spawn::Spawn;

/// Cooperative cancellation signal polled by every worker between iterations.
#[derive(Debug, Default)]
pub struct StopFlag {
    raised: AtomicBool,
}

impl StopFlag {
    /// A cleared flag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Raise the flag. Returns `true` if this call raised it.
    pub fn raise(&self) -> bool {
        !self.raised.swap(true, Ordering::Release)
    }

    /// Whether the flag has been raised.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Armed,
    Disarmed,
    Fired,
}

type TimerShared = Arc<(Mutex<TimerState>, Condvar)>;

/// One-shot delayed action running on its own thread.
///
/// The timer thread sleeps on a `Condvar` until the deadline, so disarming
/// wakes it immediately instead of waiting out the delay.
#[derive(Debug)]
pub struct StopTimer {
    shared: TimerShared,
    handle: Option<JoinHandle<()>>,
}

impl StopTimer {
    /// Run `on_fire` once, `delay` from now, unless disarmed first.
    ///
    /// # Errors
    ///
    /// Returns the spawner's error if the timer thread could not be started.
    pub fn arm<S, F>(spawner: &S, delay: Duration, on_fire: F) -> io::Result<Self>
    where
        S: Spawn,
        F: FnOnce() + Send + 'static,
    {
        let shared: TimerShared = Arc::new((Mutex::new(TimerState::Armed), Condvar::new()));
        let thread_shared = Arc::clone(&shared);
        // A delay past the clock's range never fires; only disarm ends it.
        let deadline = Instant::now().checked_add(delay);

        let handle = spawner.spawn("stop-timer", move || {
            let (state_lock, cvar) = thread_shared.as_ref();
            let mut state = state_lock.lock();
            while *state == TimerState::Armed {
                match deadline {
                    Some(deadline) => {
                        if cvar.wait_until(&mut state, deadline).timed_out() {
                            break;
                        }
                    }
                    None => cvar.wait(&mut state),
                }
            }
            if *state == TimerState::Armed {
                *state = TimerState::Fired;
                drop(state);
                debug!(delay_ms = delay.as_millis(), "Stop timer fired");
                on_fire();
            }
        })?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Cancel the timer if it has not fired and wait for its thread to exit.
    ///
    /// Returns `true` if the action had already fired. Idempotent.
    pub fn disarm(&mut self) -> bool {
        let fired = {
            let (state_lock, cvar) = self.shared.as_ref();
            let mut state = state_lock.lock();
            if *state == TimerState::Armed {
                *state = TimerState::Disarmed;
                cvar.notify_one();
            }
            *state == TimerState::Fired
        };

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Stop timer thread panicked");
            }
        }
        fired
    }
}

impl Drop for StopTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
