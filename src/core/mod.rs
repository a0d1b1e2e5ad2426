//! Worker loops, invariant checking, shared counters and the test controller.

pub mod checker;
pub mod context;
pub mod controller;
pub mod counters;
pub mod error;
pub mod monitor;
pub mod report;
pub mod spawn;
pub mod timer;
pub mod worker;

pub use checker::{Checker, Expect, Violation, ViolationDetail, ViolationLog};
pub use context::TestContext;
pub use controller::{run_configured, Controller, WorkerHandle};
pub use counters::{CounterSnapshot, Holders, SharedCounters, Transition};
pub use error::{AppResult, HarnessError};
pub use report::{Outcome, RunReport};
pub use spawn::Spawn;
pub use timer::{StopFlag, StopTimer};
pub use worker::{Role, WorkerSummary};
