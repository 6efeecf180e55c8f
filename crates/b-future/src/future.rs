//! The `AnswerFuture` state machine.
//!
//! A Pending future holds a fixed number of producer slots (its arity) and
//! a list of completion callbacks. It transitions to Resolved once every
//! slot has been filled with an answer, or to Failed the moment any slot is
//! filled with a failure. Once terminal, it never changes state again.
//!
//! Reference counting is `Arc::clone`/`Drop`, not the hand-rolled
//! retain/release of the reference design; callers that used to call
//! `release` simply drop their clone.
//!
//! A terminal transition may also carry one *persist hook*: an async,
//! internal-only step that must run to completion before any registered
//! callback is scheduled. `original_source/Source/Main.c`'s
//! `b_answer_context_callback_` calls `b_database_record_answer` inline,
//! blocking the single run-loop thread until the write returns, before the
//! loop ever dequeues the next callback — so a rule resumed after `need`, or
//! a caller observing the root future's terminal state, never races the
//! database write. [`AnswerFuture::set_persist_hook`] preserves that
//! happens-before guarantee: the hook is awaited to completion first, and
//! only then are the regular completion callbacks drained and scheduled.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::task::Waker;

use futures::future::BoxFuture;

use b_shared::{AnswerValue, BError, BResult};
use b_runloop::{CancelTask, RunLoop, Task};

/// The three states an [`AnswerFuture`] can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureState {
    Pending,
    Resolved,
    Failed,
}

/// A completion callback: invoked exactly once, on the run loop, when the
/// future it was registered on becomes terminal.
pub type Callback = Box<dyn FnOnce(AnswerFuture) -> BResult<()> + Send>;

/// An internal, one-shot async step run to completion before any
/// [`Callback`] is scheduled, only on a Resolved transition. See the module
/// doc for why this exists; `b_engine::Main` is the only current user,
/// hooking answer persistence in ahead of user-facing callbacks.
pub type PersistHook = Box<dyn FnOnce(AnswerFuture) -> BoxFuture<'static, BResult<()>> + Send>;

enum Terminal {
    Resolved(Vec<Box<dyn AnswerValue>>),
    Failed(Arc<BError>),
}

struct Inner {
    arity: usize,
    slots: Vec<Option<Box<dyn AnswerValue>>>,
    filled: usize,
    terminal: Option<Terminal>,
    callbacks: Vec<Callback>,
    persist_hook: Option<PersistHook>,
    waker: Option<Waker>,
}

/// A shared handle to a Pending/Resolved/Failed answer cell.
///
/// Cloning an `AnswerFuture` is the Rust analogue of `retain`; dropping the
/// last clone is `release`. The future and its stored answers are freed
/// once the last clone is dropped, same as the reference design's
/// last-release deallocation, just driven by `Arc`'s count instead of a
/// hand-written one.
#[derive(Clone)]
pub struct AnswerFuture {
    inner: Arc<Mutex<Inner>>,
    run_loop: Arc<dyn RunLoop>,
}

impl fmt::Debug for AnswerFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().expect("answer future mutex poisoned");
        f.debug_struct("AnswerFuture")
            .field("arity", &inner.arity)
            .field("filled", &inner.filled)
            .field("state", &state_of(&inner))
            .finish()
    }
}

fn state_of(inner: &Inner) -> FutureState {
    match inner.terminal {
        None => FutureState::Pending,
        Some(Terminal::Resolved(_)) => FutureState::Resolved,
        Some(Terminal::Failed(_)) => FutureState::Failed,
    }
}

impl AnswerFuture {
    /// The run loop this future schedules its callbacks on.
    pub fn run_loop(&self) -> Arc<dyn RunLoop> {
        self.run_loop.clone()
    }

    /// Allocates a new Pending future with `arity` producer slots.
    pub fn pending(arity: usize, run_loop: Arc<dyn RunLoop>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                arity,
                slots: (0..arity).map(|_| None).collect(),
                filled: 0,
                terminal: None,
                callbacks: Vec::new(),
                persist_hook: None,
                waker: None,
            })),
            run_loop,
        }
    }

    /// Allocates an arity-1 future that is already Resolved, used by the
    /// dispatcher on a cache or database hit.
    pub fn resolved(answer: Box<dyn AnswerValue>, run_loop: Arc<dyn RunLoop>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                arity: 1,
                slots: vec![None],
                filled: 1,
                terminal: Some(Terminal::Resolved(vec![answer])),
                callbacks: Vec::new(),
                persist_hook: None,
                waker: None,
            })),
            run_loop,
        }
    }

    /// Allocates a future that is already Failed.
    pub fn failed(error: impl Into<Arc<BError>>, run_loop: Arc<dyn RunLoop>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                arity: 1,
                slots: vec![None],
                filled: 0,
                terminal: Some(Terminal::Failed(error.into())),
                callbacks: Vec::new(),
                persist_hook: None,
                waker: None,
            })),
            run_loop,
        }
    }

    /// Registers the internal persist hook run to completion before
    /// callbacks are scheduled on a Resolved transition (see the module
    /// doc). At most one hook is meaningful per future; `b_engine::Main` is
    /// the only caller, and it registers the hook immediately after
    /// allocating a Pending future, before the rule that might resolve it
    /// ever runs. Calling this on an already-terminal future is a no-op: the
    /// hook has missed its only chance to gate anything.
    pub fn set_persist_hook(&self, hook: PersistHook) {
        let mut inner = self.inner.lock().expect("answer future mutex poisoned");
        if inner.terminal.is_none() {
            inner.persist_hook = Some(hook);
        }
    }

    pub fn state(&self) -> FutureState {
        state_of(&self.inner.lock().expect("answer future mutex poisoned"))
    }

    /// The fixed arity this future was allocated with.
    pub fn arity(&self) -> usize {
        self.inner.lock().expect("answer future mutex poisoned").arity
    }

    /// The number of answers available. Only meaningful once Resolved.
    pub fn answer_count(&self) -> usize {
        match &self.inner.lock().expect("answer future mutex poisoned").terminal {
            Some(Terminal::Resolved(answers)) => answers.len(),
            _ => 0,
        }
    }

    /// Returns a deep copy of answer `i`. Only valid once Resolved.
    pub fn answer(&self, i: usize) -> BResult<Box<dyn AnswerValue>> {
        match &self.inner.lock().expect("answer future mutex poisoned").terminal {
            Some(Terminal::Resolved(answers)) => answers
                .get(i)
                .map(|a| a.replicate())
                .ok_or_else(|| BError::precondition(format!("answer index {i} out of range"))),
            _ => Err(BError::precondition("answer() called on a non-Resolved future")),
        }
    }

    /// Returns the stored error. Only valid once Failed.
    pub fn error(&self) -> BResult<Arc<BError>> {
        match &self.inner.lock().expect("answer future mutex poisoned").terminal {
            Some(Terminal::Failed(err)) => Ok(err.clone()),
            _ => Err(BError::precondition("error() called on a non-Failed future")),
        }
    }

    /// Registers a completion callback. If this future is already terminal,
    /// `cb` is scheduled immediately on the run loop rather than invoked
    /// synchronously, matching the no-reentrancy guarantee every backend
    /// provides.
    pub fn add_callback(&self, cb: Callback) {
        let mut inner = self.inner.lock().expect("answer future mutex poisoned");
        if inner.terminal.is_some() {
            drop(inner);
            self.schedule(cb);
        } else {
            inner.callbacks.push(cb);
        }
    }

    fn schedule(&self, cb: Callback) {
        let future = self.clone();
        let task: Task = Box::new(move || cb(future));
        let cancel: CancelTask = Box::new(|| {});
        self.run_loop.add_function(task, cancel);
    }

    /// Takes the persist hook (Resolved transition only) and the callback
    /// list out of `inner`, which must already be terminal. If a hook is
    /// present it is awaited to completion on a spawned task before the
    /// callbacks are drained and scheduled; otherwise the callbacks are
    /// scheduled immediately. Either way, nothing reaches the run loop's
    /// queue until the persist write (if any) has finished, preserving the
    /// happens-before guarantee described in the module doc.
    fn finalize_terminal(&self, inner: &mut Inner) {
        let is_resolved = matches!(inner.terminal, Some(Terminal::Resolved(_)));
        let hook = inner.persist_hook.take().filter(|_| is_resolved);
        let callbacks = std::mem::take(&mut inner.callbacks);
        match hook {
            None => {
                for cb in callbacks {
                    self.schedule(cb);
                }
            }
            Some(hook) => {
                let future = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = hook(future.clone()).await {
                        tracing::warn!(error = %e, "persist hook failed");
                    }
                    for cb in callbacks {
                        future.schedule(cb);
                    }
                });
            }
        }
    }

    /// Awaitable alternative to [`Self::add_callback`], for rules written as
    /// ordinary `async fn`s: `ctx.need_one(q).await?.wait().await?` suspends
    /// the calling task and resumes it once this future turns terminal,
    /// without needing a run-loop callback of its own. Resolves to `Ok(())`
    /// once Resolved, or the stored error once Failed; read answers
    /// afterwards via [`Self::answer`].
    pub fn wait(&self) -> impl std::future::Future<Output = Result<(), Arc<BError>>> + '_ {
        std::future::poll_fn(move |cx| {
            let mut inner = self.inner.lock().expect("answer future mutex poisoned");
            match &inner.terminal {
                None => {
                    inner.waker = Some(cx.waker().clone());
                    std::task::Poll::Pending
                }
                Some(Terminal::Resolved(_)) => std::task::Poll::Ready(Ok(())),
                Some(Terminal::Failed(err)) => std::task::Poll::Ready(Err(err.clone())),
            }
        })
    }

    /// Resolves an arity-1 Pending future with `answer`. Precondition:
    /// arity 1 and currently Pending.
    pub fn resolve(&self, answer: Box<dyn AnswerValue>) -> BResult<()> {
        self.resolve_slot(0, answer)
    }

    /// Fills slot `i` of a Pending future with an answer. Transitions to
    /// Resolved once every slot has been filled.
    pub fn resolve_slot(&self, i: usize, answer: Box<dyn AnswerValue>) -> BResult<()> {
        let mut inner = self.inner.lock().expect("answer future mutex poisoned");
        if inner.terminal.is_some() {
            // A failed multi-arity future ignores further slot fills.
            if matches!(inner.terminal, Some(Terminal::Failed(_))) {
                return Ok(());
            }
            return Err(BError::precondition("resolve_slot called on a terminal future"));
        }
        if i >= inner.arity {
            return Err(BError::precondition(format!(
                "resolve_slot index {i} out of range for arity {}",
                inner.arity
            )));
        }
        if inner.slots[i].is_some() {
            return Err(BError::precondition(format!("slot {i} already filled")));
        }
        inner.slots[i] = Some(answer);
        inner.filled += 1;
        if inner.filled == inner.arity {
            let answers = inner.slots.iter_mut().map(|s| s.take().unwrap()).collect();
            inner.terminal = Some(Terminal::Resolved(answers));
            if let Some(waker) = inner.waker.take() {
                waker.wake();
            }
            self.finalize_terminal(&mut inner);
        }
        Ok(())
    }

    /// Fails slot `i` of a Pending future. The future transitions to Failed
    /// immediately; subsequent slot fills (resolve or fail) are ignored,
    /// not fatal.
    pub fn fail_slot(&self, i: usize, error: impl Into<Arc<BError>>) -> BResult<()> {
        let _ = i;
        let mut inner = self.inner.lock().expect("answer future mutex poisoned");
        if inner.terminal.is_some() {
            return Ok(());
        }
        inner.terminal = Some(Terminal::Failed(error.into()));
        if let Some(waker) = inner.waker.take() {
            waker.wake();
        }
        self.finalize_terminal(&mut inner);
        Ok(())
    }

    /// Fails this future unconditionally. Precondition: currently Pending;
    /// calling `fail` a second time is a precondition violation (unlike
    /// `fail_slot`, which tolerates being called again once terminal).
    pub fn fail(&self, error: impl Into<Arc<BError>>) -> BResult<()> {
        let mut inner = self.inner.lock().expect("answer future mutex poisoned");
        if inner.terminal.is_some() {
            return Err(BError::precondition("fail called on an already-terminal future"));
        }
        inner.terminal = Some(Terminal::Failed(error.into()));
        if let Some(waker) = inner.waker.take() {
            waker.wake();
        }
        self.finalize_terminal(&mut inner);
        Ok(())
    }
}
