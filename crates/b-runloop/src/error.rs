//! Errors raised by the run loop backends.

use b_shared::BError;
use thiserror::Error;

pub type RunLoopResult<T> = Result<T, RunLoopError>;

/// Errors surfaced by [`crate::RunLoop`] implementations.
#[derive(Debug, Error)]
pub enum RunLoopError {
    /// The `plain` backend's queue drained with `stop` never called — the
    /// reference implementation's `ENOTSUP`, read here as "this looks like a
    /// deadlock".
    #[error("run loop queue drained without stop() being called (possible deadlock)")]
    Deadlock,

    /// A backend was asked to do something it does not implement (e.g.
    /// process watching on the `plain` backend).
    #[error("unsupported on this run loop backend: {0}")]
    Unsupported(&'static str),

    /// A queued task callback returned an error; the loop stops and the
    /// error is reported to the caller of `run`.
    #[error(transparent)]
    TaskFailed(#[from] BError),

    /// Spawning or waiting on a child process failed.
    #[error("process error: {0}")]
    Process(#[from] std::io::Error),
}
