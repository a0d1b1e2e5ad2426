//! Thread spawning for workers and timers.

pub mod thread_spawner;

pub use thread_spawner::ThreadSpawner;
