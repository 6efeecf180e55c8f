//! The `plain` backend: a LIFO stack of one-shot tasks, no process
//! watching. Mirrors the reference implementation's `RunLoopPlain.c` order
//! exactly, including treating an empty, unstopped queue as a deadlock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::{RunLoopError, RunLoopResult};
use crate::{CancelTask, RunLoop, Task};

struct Entry {
    task: Task,
    cancel: CancelTask,
}

/// A single-threaded, cooperative run loop with no process-watching
/// support. Tasks run in LIFO order: the most recently added task runs
/// next. Tests that depend on ordering are documented as relying on this.
#[derive(Default)]
pub struct PlainRunLoop {
    queue: Mutex<Vec<Entry>>,
    stopped: AtomicBool,
}

impl std::fmt::Debug for PlainRunLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.queue.lock().expect("run loop queue mutex poisoned").len();
        f.debug_struct("PlainRunLoop")
            .field("queued", &len)
            .field("stopped", &self.stopped.load(Ordering::SeqCst))
            .finish()
    }
}

impl PlainRunLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RunLoop for PlainRunLoop {
    fn add_function(&self, task: Task, cancel: CancelTask) {
        self.queue
            .lock()
            .expect("run loop queue mutex poisoned")
            .push(Entry { task, cancel });
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    async fn run(&self) -> RunLoopResult<()> {
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                return Ok(());
            }

            let entry = self.queue.lock().expect("run loop queue mutex poisoned").pop();
            match entry {
                Some(entry) => (entry.task)()?,
                None => return Err(RunLoopError::Deadlock),
            }
        }
    }
}

impl Drop for PlainRunLoop {
    fn drop(&mut self) {
        let remaining = std::mem::take(
            &mut *self.queue.lock().expect("run loop queue mutex poisoned"),
        );
        for entry in remaining {
            (entry.cancel)();
        }
    }
}
