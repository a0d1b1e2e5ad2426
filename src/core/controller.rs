//! Test controller: spawns workers, bounds the run, joins and reports.

use std::any::Any;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::checker::{Expect, ViolationDetail};
use super::context::TestContext;
use super::error::HarnessError;
use super::report::{Outcome, RunReport};
use super::spawn::Spawn;
use super::timer::StopTimer;
use super::worker::{self, Role, WorkerSummary};
use crate::config::HarnessConfig;
use crate::runtime::ThreadSpawner;
use crate::rwlock::{
    CountingRwLock, DowngradableLock, LockKind, ParkingLotRwLock, SplitDowngradeLock,
};
use crate::util::clock::now_ms;

/// A spawned worker awaiting join.
#[derive(Debug)]
pub struct WorkerHandle {
    /// Worker role.
    pub role: Role,
    /// Index within the role.
    pub index: usize,
    /// Diagnostic label.
    pub label: String,
    handle: JoinHandle<WorkerSummary>,
}

/// Runs one bounded stress test per call to [`run`](Self::run).
#[derive(Debug, Clone)]
pub struct Controller<S = ThreadSpawner> {
    config: HarnessConfig,
    spawner: S,
}

impl Controller<ThreadSpawner> {
    /// Controller spawning workers on plain OS threads.
    #[must_use]
    pub const fn new(config: HarnessConfig) -> Self {
        Self::with_spawner(config, ThreadSpawner::new())
    }
}

impl<S: Spawn> Controller<S> {
    /// Controller using a custom spawner.
    pub const fn with_spawner(config: HarnessConfig, spawner: S) -> Self {
        Self { config, spawner }
    }

    /// The run configuration.
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Stress `lock` for the configured duration and report.
    ///
    /// Blocks until every worker has been joined. If the lock under test
    /// deadlocks, so does this call.
    ///
    /// # Errors
    ///
    /// - `HarnessError::Config` if the configuration is invalid
    /// - `HarnessError::SetupFailure` if a worker or the timer could not be
    ///   spawned; workers already running are stopped and joined first
    pub fn run<L: DowngradableLock>(&self, lock: L) -> Result<RunReport, HarnessError> {
        self.config.validate().map_err(HarnessError::Config)?;

        let run_id = Uuid::new_v4();
        let lock_name = lock.name();
        let ctx = Arc::new(TestContext::new(
            lock,
            self.config.cooperative_yield,
            self.config.max_recorded_violations,
        ));
        let started = Instant::now();
        let started_at_ms = now_ms();
        let cpus = num_cpus::get();

        info!(
            %run_id,
            lock = lock_name,
            readers = self.config.readers,
            writers = self.config.writers,
            downgraders = self.config.downgraders,
            duration_secs = self.config.duration_secs,
            cooperative_yield = self.config.cooperative_yield,
            cpus,
            "Starting rwsem stress run"
        );
        if self.config.total_workers() == 0 {
            warn!("No workers configured; the run only exercises setup and teardown");
        }

        let mut handles = Vec::with_capacity(self.config.total_workers() + 1);
        if let Err(err) = self.spawn_workers(&ctx, &mut handles) {
            return Err(abort_setup(&ctx, handles, err));
        }

        let timer_ctx = Arc::clone(&ctx);
        let mut timer = match StopTimer::arm(&self.spawner, self.config.duration(), move || {
            timer_ctx.stop().raise();
        }) {
            Ok(timer) => timer,
            Err(source) => {
                let err = HarnessError::SetupFailure {
                    label: "stop-timer".into(),
                    source,
                };
                return Err(abort_setup(&ctx, handles, err));
            }
        };

        let workers = join_workers(&ctx, handles);
        let timer_fired = timer.disarm();
        ctx.stop().raise();
        let elapsed_ms = started.elapsed().as_millis();

        ctx.checker("controller")
            .check(Expect::Free, ctx.counters().holders());

        let violation_count = ctx.violations().count();
        let outcome = if violation_count == 0 {
            Outcome::Passed
        } else {
            Outcome::Failed
        };
        let counters = ctx.counters().snapshot();

        info!(
            %run_id,
            reads_taken = counters.reads_taken,
            writes_taken = counters.writes_taken,
            downgrades_taken = counters.downgrades_taken,
            violations = violation_count,
            elapsed_ms,
            %outcome,
            "Stress run complete"
        );

        Ok(RunReport {
            run_id,
            lock: lock_name.to_owned(),
            started_at_ms,
            duration_secs: self.config.duration_secs,
            elapsed_ms,
            cpus,
            timer_fired,
            counters,
            lock_state: ctx.lock().raw_state(),
            violation_count,
            violations: ctx.violations().records(),
            workers,
            outcome,
        })
    }

    /// Spawn every worker, interleaving roles by index so they start together.
    fn spawn_workers<L: DowngradableLock>(
        &self,
        ctx: &Arc<TestContext<L>>,
        handles: &mut Vec<WorkerHandle>,
    ) -> Result<(), HarnessError> {
        let cfg = &self.config;
        let widest = cfg.readers.max(cfg.writers).max(cfg.downgraders);

        for index in 0..widest {
            for (role, count) in [
                (Role::Reader, cfg.readers),
                (Role::Writer, cfg.writers),
                (Role::Downgrader, cfg.downgraders),
            ] {
                if index < count {
                    handles.push(self.spawn_worker(ctx, role, index)?);
                }
            }
        }

        if cfg.monitor {
            handles.push(self.spawn_worker(ctx, Role::Monitor, 0)?);
        }
        Ok(())
    }

    fn spawn_worker<L: DowngradableLock>(
        &self,
        ctx: &Arc<TestContext<L>>,
        role: Role,
        index: usize,
    ) -> Result<WorkerHandle, HarnessError> {
        let label = role.label(index);
        let worker_ctx = Arc::clone(ctx);
        let handle = self
            .spawner
            .spawn(&label, move || worker::run(role, &worker_ctx, index))
            .map_err(|source| HarnessError::SetupFailure {
                label: label.clone(),
                source,
            })?;

        debug!(worker = %label, "Worker spawned");
        Ok(WorkerHandle {
            role,
            index,
            label,
            handle,
        })
    }
}

/// Stress a lock of the configured [`LockKind`] with the default spawner.
///
/// # Errors
///
/// As [`Controller::run`].
pub fn run_configured(config: HarnessConfig) -> Result<RunReport, HarnessError> {
    let lock = config.lock;
    let controller = Controller::new(config);
    match lock {
        LockKind::ParkingLot => controller.run(ParkingLotRwLock::new()),
        LockKind::Counting => controller.run(CountingRwLock::new()),
        LockKind::SplitDowngrade => controller.run(SplitDowngradeLock::new()),
    }
}

fn abort_setup<L: DowngradableLock>(
    ctx: &TestContext<L>,
    handles: Vec<WorkerHandle>,
    err: HarnessError,
) -> HarnessError {
    error!(error = %err, spawned = handles.len(), "Setup failed; stopping spawned workers");
    ctx.stop().raise();
    join_workers(ctx, handles);
    err
}

/// Join every handle. A panicked worker is recorded as a violation.
fn join_workers<L: DowngradableLock>(
    ctx: &TestContext<L>,
    handles: Vec<WorkerHandle>,
) -> Vec<WorkerSummary> {
    handles
        .into_iter()
        .map(|worker| match worker.handle.join() {
            Ok(summary) => summary,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(worker = %worker.label, %message, "Worker panicked");
                ctx.checker(&worker.label)
                    .report(ViolationDetail::Panicked { message });
                WorkerSummary {
                    role: worker.role,
                    index: worker.index,
                    label: worker.label,
                    iterations: 0,
                    completed: false,
                }
            }
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
