//! A minimal executor handle: a `tokio` runtime handle bundled with an
//! exit signal and a logger, so every spawned task can be cancelled
//! together and logs with consistent context.
//!
//! Every task the Observable State Processor runs (the aggregation job,
//! the slot/import-driven continuous job) is spawned through this, never
//! through a bare `tokio::spawn`, so `stop()` has one place to reach all
//! of them.

use futures::{future, Future, FutureExt};
use slog::{crit, debug, o, Logger};
use std::sync::Arc;
use tokio::runtime::Handle;

mod metrics {
    use lazy_static::lazy_static;
    pub use lighthouse_metrics::*;

    lazy_static! {
        pub static ref TASKS_SPAWNED_TOTAL: Result<IntCounter> = try_create_int_counter(
            "task_executor_tasks_spawned_total",
            "Total number of tasks spawned through TaskExecutor"
        );
    }
}

/// A wrapper around a tokio `Handle` which provides:
///
/// - The ability to check if the runtime has already been shut down (`exit`).
/// - A signal for tasks to know when to stop (`exit.clone()`).
/// - Re-use of the same logger from one task to the next.
#[derive(Clone)]
pub struct TaskExecutor {
    handle: Handle,
    exit: exit_future::Exit,
    signal: Arc<Option<exit_future::Signal>>,
    log: Logger,
}

impl TaskExecutor {
    pub fn new(handle: Handle, log: Logger) -> (Self, exit_future::Signal) {
        let (signal, exit) = exit_future::signal();
        (
            Self {
                handle,
                exit,
                signal: Arc::new(None),
                log,
            },
            signal,
        )
    }

    /// Returns a logger tagged with `service`, to match the teacher's habit
    /// of tagging each spawned task with its own logger context.
    pub fn log(&self, service: &'static str) -> Logger {
        self.log.new(o!("service" => service))
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn exit(&self) -> exit_future::Exit {
        self.exit.clone()
    }

    /// Spawns a future, terminating it early (and logging at `debug!`) if
    /// the exit signal fires before it completes.
    pub fn spawn<F>(&self, future: F, name: &'static str)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let exit = self.exit.clone();
        let log = self.log.clone();
        metrics::inc_counter(&metrics::TASKS_SPAWNED_TOTAL);
        self.handle.spawn(future::select(Box::pin(future), exit).map(move |_| {
            debug!(log, "Task shutting down"; "task" => name);
        }));
    }

    /// Spawns a blocking closure (e.g. a potentially long-running state
    /// transition) on the blocking thread pool, so it never occupies a
    /// reactor thread the continuous executor needs.
    pub fn spawn_blocking<F>(&self, f: F, name: &'static str)
    where
        F: FnOnce() + Send + 'static,
    {
        let log = self.log.clone();
        metrics::inc_counter(&metrics::TASKS_SPAWNED_TOTAL);
        let handle = self.handle.spawn_blocking(f);
        self.handle.spawn(async move {
            if let Err(e) = handle.await {
                crit!(log, "Blocking task panicked"; "task" => name, "error" => %e);
            }
        });
    }
}
