//! Process exit status, unified across POSIX signal/code and (represented
//! but unreachable on the targets this workspace builds for) Windows
//! exception termination.

/// The outcome of a watched child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExitStatus {
    /// The process was terminated by a signal.
    Signal(i32),
    /// The process exited normally with this code.
    Code(i64),
    /// The process was terminated by an unhandled structured exception.
    /// Windows-only in the reference implementation; never produced on the
    /// Unix targets this workspace builds for.
    Exception(u32),
}

impl ProcessExitStatus {
    /// Build a [`ProcessExitStatus`] from a `std::process::ExitStatus`
    /// obtained via `tokio::process::Child::wait()`.
    #[cfg(unix)]
    pub fn from_std(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        match status.signal() {
            Some(signal) => Self::Signal(signal),
            None => Self::Code(i64::from(status.code().unwrap_or_default())),
        }
    }
}
