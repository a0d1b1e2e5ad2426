//! OS thread spawner implementation.

use std::io;
use std::thread::{self, JoinHandle};

use crate::core::Spawn;

/// Spawner that runs each worker on a dedicated, named OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSpawner {
    stack_size: Option<usize>,
}

impl ThreadSpawner {
    /// Spawner using the platform default stack size.
    #[must_use]
    pub const fn new() -> Self {
        Self { stack_size: None }
    }

    /// Spawner using the given stack size for every thread.
    #[must_use]
    pub const fn with_stack_size(stack_size: usize) -> Self {
        Self {
            stack_size: Some(stack_size),
        }
    }
}

impl Spawn for ThreadSpawner {
    fn spawn<F, T>(&self, label: &str, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut builder = thread::Builder::new().name(label.to_owned());
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn(f)
    }
}
