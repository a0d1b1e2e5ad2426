//! Abstraction over starting and joining labeled worker threads.

use std::io;
use std::thread::JoinHandle;

/// Starts labeled, joinable threads.
///
/// The controller spawns every worker and the stop timer through this trait,
/// so a failing implementation can exercise the setup-failure path.
pub trait Spawn: Send + Sync {
    /// Start `f` on a new thread labeled `label`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread could not be created.
    fn spawn<F, T>(&self, label: &str, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;
}
