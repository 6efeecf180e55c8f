//! The dispatcher seam `AnswerContext` calls back into.
//!
//! `b-context` only needs to be able to ask a dispatcher for a sub-question's
//! future; it does not need to know about memoization, the answer cache, or
//! the database. Defining the seam here (rather than depending on
//! `b-engine` directly) keeps the dependency graph acyclic: `b-engine`
//! depends on `b-context` to build the `AnswerContext` it hands rules, and
//! `b-context` depends only on this trait, which `b-engine::Main`
//! implements.

use b_future::AnswerFuture;
use b_shared::{BResult, QuestionValue};

/// Anything that can answer a question, returning a future for its answer.
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync + std::fmt::Debug {
    /// Returns a future that will resolve to `question`'s answer. May be
    /// called re-entrantly from within a rule invocation (via `need`).
    async fn ask(&self, question: Box<dyn QuestionValue>) -> BResult<AnswerFuture>;
}
