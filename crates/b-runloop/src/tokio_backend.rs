//! The `tokio`-backed run loop: the preferred backend on every platform
//! this workspace targets. An unbounded `mpsc` channel plays the role the
//! reference implementation's kqueue backend gives to an auto-reset
//! user-event filter — `recv().await` parks the loop exactly when the
//! kqueue backend would block in `kevent`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::{mpsc, Notify};

use crate::error::RunLoopResult;
use crate::exit_status::ProcessExitStatus;
use crate::{CancelTask, ExitCallback, RunLoop, Task};

enum Entry {
    Function(Task),
    ProcessExit(ExitCallback, ProcessExitStatus),
}

/// A run loop backed by a `tokio` runtime handle. Tasks and process-exit
/// notifications share a single `mpsc` queue; `add_process` spawns a
/// watcher task on the supplied handle that awaits the child and forwards
/// its exit status through that queue.
pub struct TokioRunLoop {
    handle: tokio::runtime::Handle,
    sender: mpsc::UnboundedSender<Entry>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Entry>>>,
    stopped: AtomicBool,
    stop_notify: Notify,
    outstanding_watches: AtomicUsize,
}

impl std::fmt::Debug for TokioRunLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioRunLoop")
            .field("stopped", &self.stopped.load(Ordering::SeqCst))
            .field(
                "outstanding_watches",
                &self.outstanding_watches.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl TokioRunLoop {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            handle,
            sender,
            receiver: Mutex::new(Some(receiver)),
            stopped: AtomicBool::new(false),
            stop_notify: Notify::new(),
            outstanding_watches: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl RunLoop for TokioRunLoop {
    fn add_function(&self, task: Task, cancel: CancelTask) {
        if self.sender.send(Entry::Function(task)).is_err() {
            cancel();
        }
    }

    fn add_process(
        &self,
        mut child: tokio::process::Child,
        exit_cb: ExitCallback,
        cancel: CancelTask,
    ) -> RunLoopResult<()> {
        let sender = self.sender.clone();
        self.outstanding_watches.fetch_add(1, Ordering::SeqCst);
        self.handle.spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    let status = ProcessExitStatus::from_std(status);
                    if sender.send(Entry::ProcessExit(exit_cb, status)).is_err() {
                        cancel();
                    }
                }
                Err(_) => cancel(),
            }
        });
        Ok(())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.stop_notify.notify_waiters();
    }

    async fn run(&self) -> RunLoopResult<()> {
        let mut receiver = self
            .receiver
            .lock()
            .expect("run loop receiver mutex poisoned")
            .take()
            .expect("TokioRunLoop::run called more than once");

        loop {
            if self.stopped.load(Ordering::SeqCst) {
                return Ok(());
            }

            tokio::select! {
                _ = self.stop_notify.notified() => {
                    if self.stopped.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                }
                entry = receiver.recv() => {
                    match entry {
                        Some(Entry::Function(task)) => task()?,
                        Some(Entry::ProcessExit(cb, status)) => {
                            self.outstanding_watches.fetch_sub(1, Ordering::SeqCst);
                            cb(status)?;
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn runs_queued_tasks_and_then_stops() {
        let rl = Arc::new(TokioRunLoop::new(tokio::runtime::Handle::current()));
        let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let seen2 = seen.clone();
        let stopper = rl.clone();
        rl.add_function(
            Box::new(move || {
                seen2.fetch_add(1, Ordering::SeqCst);
                stopper.stop();
                Ok(())
            }),
            Box::new(|| {}),
        );

        rl.run().await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn process_watch_fires_exit_callback() {
        let rl = Arc::new(TokioRunLoop::new(tokio::runtime::Handle::current()));
        let child = tokio::process::Command::new("true")
            .spawn()
            .expect("spawning `true` must succeed in test environments");

        let stopper = rl.clone();
        rl.add_process(
            child,
            Box::new(move |status| {
                assert_eq!(status, ProcessExitStatus::Code(0));
                stopper.stop();
                Ok(())
            }),
            Box::new(|| {}),
        )
        .unwrap();

        rl.run().await.unwrap();
    }
}
