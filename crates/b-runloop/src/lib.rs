//! Cooperative single-threaded run loops.
//!
//! A [`RunLoop`] drives one-shot function tasks and, where the backend
//! supports it, child-process reaping, to completion one at a time. Two
//! backends are provided: [`plain::PlainRunLoop`], a minimal queue that
//! mirrors the reference implementation's "plain" backend exactly (LIFO
//! order, `ENOTSUP`-equivalent on drain-without-stop), and
//! [`tokio_backend::TokioRunLoop`], the backend `allocate_preferred` returns
//! on every platform this workspace targets.

pub mod error;
pub mod exit_status;
pub mod plain;
pub mod tokio_backend;

pub use error::{RunLoopError, RunLoopResult};
pub use exit_status::ProcessExitStatus;
pub use plain::PlainRunLoop;
pub use tokio_backend::TokioRunLoop;

use b_shared::BResult;

/// A queued one-shot task. Runs to completion before the next task is
/// dequeued.
pub type Task = Box<dyn FnOnce() -> BResult<()> + Send>;

/// Runs if a task is still queued when the run loop is torn down.
pub type CancelTask = Box<dyn FnOnce() + Send>;

/// Invoked exactly once when a watched process exits.
pub type ExitCallback = Box<dyn FnOnce(ProcessExitStatus) -> BResult<()> + Send>;

/// Common interface implemented by every run loop backend.
#[async_trait::async_trait]
pub trait RunLoop: Send + Sync + std::fmt::Debug {
    /// Appends a one-shot task. `cancel` runs instead of `task` if the run
    /// loop is torn down with the task still queued.
    fn add_function(&self, task: Task, cancel: CancelTask);

    /// Watches a child process; when it exits, `exit_cb` is invoked with its
    /// exit status. Backends that cannot watch processes (the `plain`
    /// backend) return [`RunLoopError::Unsupported`].
    fn add_process(
        &self,
        child: tokio::process::Child,
        exit_cb: ExitCallback,
        cancel: CancelTask,
    ) -> RunLoopResult<()> {
        drop((child, exit_cb, cancel));
        Err(RunLoopError::Unsupported("process watching"))
    }

    /// Requests that `run` return cleanly after the currently-executing
    /// task (or immediately, if none is executing).
    fn stop(&self);

    /// Drives the loop until `stop` is called or (the `plain` backend only)
    /// the queue drains with no process watches outstanding.
    async fn run(&self) -> RunLoopResult<()>;
}

/// Chooses the best-available backend for the current platform. Every
/// platform this workspace builds for resolves to [`TokioRunLoop`].
pub fn allocate_preferred(handle: tokio::runtime::Handle) -> TokioRunLoop {
    TokioRunLoop::new(handle)
}
