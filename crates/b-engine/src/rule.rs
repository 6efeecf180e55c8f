//! The user-supplied rule callback.
//!
//! The distilled design passes rules a raw `opaque` pointer alongside
//! `main` and `ctx`; a `Box<dyn Rule>` with whatever fields a concrete rule
//! needs replaces that pointer, so no unsafe downcast is required at the
//! call site.
//!
//! Because `AnswerContext::need`/`need_one` are themselves `async fn`s (they
//! call through an `async_trait` dispatcher and database), a rule's
//! suspend-and-resume is expressed directly as `.await` on a dependency
//! future rather than as a return-and-be-recalled-later callback chain —
//! the native-async rendering the core design explicitly anticipates.

use std::sync::Arc;

use b_context::AnswerContext;
use b_shared::BResult;

use crate::dispatcher::Main;

/// Builds the answer for one question type (or a family of them, dispatched
/// on the question's own data). Exactly one of `ctx.succeed()`,
/// `ctx.succeed_answer()`, or `ctx.fail()` must be called before `invoke`
/// returns `Ok(())`; returning `Err` before doing so is equivalent to
/// calling `ctx.fail()` with that error (`Main` applies it on the rule's
/// behalf).
#[async_trait::async_trait]
pub trait Rule: Send + Sync + std::fmt::Debug {
    async fn invoke(&self, main: Arc<Main>, ctx: AnswerContext) -> BResult<()>;
}
