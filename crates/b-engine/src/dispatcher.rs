//! `Main`, the process-wide dispatcher: the answer cache, the database, the
//! run loop, and the user's rule live here exactly as described for the
//! reference `Main` type. `ask` implements the three-step
//! cache/database/rule-invocation algorithm unchanged; the one Rust-specific
//! addition is that step 3's rule invocation runs as a spawned task on a
//! `tokio::runtime::Handle` rather than inline, since a rule may itself
//! `.await` a dependency future across multiple run-loop iterations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use b_context::{AnswerContext, Dispatcher};
use b_db::{Database, Fingerprint, InMemoryDatabase, PostgresDatabase};
use b_future::{AnswerFuture, FutureState};
use b_runloop::{PlainRunLoop, RunLoop, TokioRunLoop};
use b_shared::{AnswerValue, BError, BResult, QuestionValue};
use tracing::{debug, instrument, warn};

use crate::config::{EngineConfig, RunLoopBackend};
use crate::error::EngineResult;
use crate::rule::Rule;

/// Process-wide dispatcher state: the database handle, the run loop, the
/// user's rule, and the in-memory answer cache mapping question fingerprint
/// to in-flight-or-completed future.
///
/// Always held as `Arc<Main>` (see [`Self::allocate`]): `ask` needs to hand
/// out a `Arc<dyn Dispatcher>` pointing at itself to every `AnswerContext`
/// it builds, and to every spawned rule invocation.
pub struct Main {
    self_weak: Weak<Main>,
    database: Arc<dyn Database>,
    run_loop: Arc<dyn RunLoop>,
    handle: tokio::runtime::Handle,
    rule: Arc<dyn Rule>,
    cache: Mutex<HashMap<Fingerprint, AnswerFuture>>,
}

impl std::fmt::Debug for Main {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.cache.lock().expect("answer cache mutex poisoned").len();
        f.debug_struct("Main").field("cached_fingerprints", &entries).finish()
    }
}

impl Main {
    /// Allocates a new dispatcher. `handle` drives spawned rule invocations
    /// and must belong to the same runtime that will eventually drive
    /// `run_loop.run()`.
    pub fn allocate(
        database: Arc<dyn Database>,
        run_loop: Arc<dyn RunLoop>,
        handle: tokio::runtime::Handle,
        rule: Arc<dyn Rule>,
    ) -> Arc<Main> {
        Arc::new_cyclic(|weak| Main {
            self_weak: weak.clone(),
            database,
            run_loop,
            handle,
            rule,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Allocates a dispatcher from an [`EngineConfig`]: picks the run loop
    /// backend named by `config.run_loop_backend`, connects to
    /// `config.database_url` if set (falling back to
    /// [`b_db::InMemoryDatabase`] otherwise), and runs `check_all` against
    /// every vtable `rule` cares about when `config.check_all_on_startup` is
    /// set. `handle` drives spawned rule invocations exactly as in
    /// [`Self::allocate`].
    pub async fn from_config(
        config: &EngineConfig,
        handle: tokio::runtime::Handle,
        rule: Arc<dyn Rule>,
    ) -> EngineResult<Arc<Main>> {
        let run_loop: Arc<dyn RunLoop> = match config.run_loop_backend {
            RunLoopBackend::Plain => Arc::new(PlainRunLoop::new()),
            RunLoopBackend::Tokio => Arc::new(TokioRunLoop::new(handle.clone())),
        };

        let database: Arc<dyn Database> = match &config.database_url {
            Some(url) => Arc::new(PostgresDatabase::connect(url).await?),
            None => Arc::new(InMemoryDatabase::new()),
        };

        let main = Self::allocate(database, run_loop, handle, rule);
        if config.check_all_on_startup {
            main.check_all(&[]).await?;
        }
        Ok(main)
    }

    fn self_arc(&self) -> Arc<Main> {
        self.self_weak
            .upgrade()
            .expect("Main invoked a rule after its own Arc was dropped")
    }

    /// Invalidates stored answers whose recorded inputs no longer match
    /// reality, per `Database::check_all`. Rechecks never invoke rules
    /// themselves; callers re-`ask` anything this invalidates.
    pub async fn check_all(&self, vtables: &[b_shared::TypeUuid]) -> BResult<()> {
        self.database
            .check_all(vtables)
            .await
            .map_err(|e| BError::database(e.to_string()))
    }

    /// Asks for `question`'s answer, then drives `run_loop.run()` until that
    /// root future resolves, at which point the run loop is told to stop
    /// (matching the reference design's top-level driver). Returns the
    /// resolved answer, or the propagated failure.
    #[instrument(skip(self, question), fields(question = ?question))]
    pub async fn run_until_resolved(
        self: Arc<Self>,
        question: Box<dyn QuestionValue>,
    ) -> BResult<Box<dyn AnswerValue>> {
        let dispatcher: Arc<dyn Dispatcher> = self.clone();
        let future = dispatcher.ask(question).await?;

        let stopper = self.run_loop.clone();
        future.add_callback(Box::new(move |_| {
            stopper.stop();
            Ok(())
        }));

        self.run_loop
            .run()
            .await
            .map_err(|e| BError::rule_failure(e.to_string()))?;

        match future.state() {
            FutureState::Resolved => future.answer(0),
            FutureState::Failed => Err(BError::rule_failure(future.error()?.to_string())),
            FutureState::Pending => Err(BError::NeverResolved),
        }
    }
}

#[async_trait::async_trait]
impl Dispatcher for Main {
    #[instrument(skip(self, question))]
    async fn ask(&self, question: Box<dyn QuestionValue>) -> BResult<AnswerFuture> {
        let fingerprint = Fingerprint::of(question.as_ref())?;

        // Step 1: cache hit, at most one in-flight build per fingerprint.
        if let Some(future) = self
            .cache
            .lock()
            .expect("answer cache mutex poisoned")
            .get(&fingerprint)
        {
            debug!(%fingerprint, "cache hit");
            return Ok(future.clone());
        }

        // Step 2: persistent database hit.
        let answer_vtable = question.vtable().answer_vtable;
        let stored = self
            .database
            .look_up_answer(&fingerprint, answer_vtable)
            .await
            .map_err(|e| BError::database(e.to_string()))?;
        if let Some(answer) = stored {
            debug!(%fingerprint, "database hit");
            let future = AnswerFuture::resolved(answer, self.run_loop.clone());
            self.cache
                .lock()
                .expect("answer cache mutex poisoned")
                .insert(fingerprint, future.clone());
            return Ok(future);
        }

        // Step 3: cache miss. Install the Pending future before invoking the
        // rule so concurrent asks from sibling dependencies see it.
        let future = AnswerFuture::pending(1, self.run_loop.clone());
        self.cache
            .lock()
            .expect("answer cache mutex poisoned")
            .insert(fingerprint.clone(), future.clone());

        // Internal persist hook: on Resolved, persist the answer under the
        // cache key. Registered before the rule ever sees the future, and
        // awaited to completion before any user-facing callback the rule or
        // its caller adds later is scheduled, so the database write
        // happens-before the rule resuming or `run_until_resolved` returning.
        let db = self.database.clone();
        let key = fingerprint.clone();
        future.set_persist_hook(Box::new(move |f| {
            Box::pin(async move {
                let answer = f.answer(0)?;
                if let Err(e) = db.record_answer(&key, answer.as_ref()).await {
                    warn!(error = %e, %key, "failed to persist answer");
                }
                Ok(())
            })
        }));

        let dispatcher: Arc<dyn Dispatcher> = self.self_arc();
        let ctx = AnswerContext::new(question, future.clone(), dispatcher, self.database.clone());

        let rule = self.rule.clone();
        let main = self.self_arc();
        let future_for_failure = future.clone();
        self.handle.spawn(async move {
            if let Err(e) = rule.invoke(main, ctx).await {
                if future_for_failure.state() == FutureState::Pending {
                    let _ = future_for_failure.fail(e);
                }
            }
        });

        Ok(future)
    }
}
