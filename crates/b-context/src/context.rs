//! `AnswerContext`: the one-shot handle a dispatcher passes to a rule
//! invocation.

use std::sync::Arc;

use b_db::{Database, Fingerprint};
use b_future::AnswerFuture;
use b_shared::{AnswerValue, BError, BResult, QuestionValue};

use crate::dispatcher::Dispatcher;

/// Bundles the question being answered, the future that will receive the
/// result, and references back to the dispatcher and database so a rule can
/// declare sub-question dependencies.
///
/// `succeed`, `succeed_answer`, and `fail` each consume `self`: Rust's
/// ownership model enforces "call exactly one of these" at compile time,
/// strictly stronger than the run-time precondition check the reference
/// design relies on.
pub struct AnswerContext {
    question: Box<dyn QuestionValue>,
    future: AnswerFuture,
    dispatcher: Arc<dyn Dispatcher>,
    database: Arc<dyn Database>,
}

impl std::fmt::Debug for AnswerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerContext")
            .field("question", &self.question)
            .finish()
    }
}

impl AnswerContext {
    pub fn new(
        question: Box<dyn QuestionValue>,
        future: AnswerFuture,
        dispatcher: Arc<dyn Dispatcher>,
        database: Arc<dyn Database>,
    ) -> Self {
        Self {
            question,
            future,
            dispatcher,
            database,
        }
    }

    /// The question this context was created to answer.
    pub fn question(&self) -> &dyn QuestionValue {
        self.question.as_ref()
    }

    /// Declares `questions` as dependencies of this context's question,
    /// records each dependency edge, asks the dispatcher for each one, and
    /// returns a future that resolves with all of their answers in
    /// declaration order.
    pub async fn need(&self, questions: Vec<Box<dyn QuestionValue>>) -> BResult<AnswerFuture> {
        if questions.is_empty() {
            return Err(BError::precondition("need requires at least one question"));
        }

        let from = Fingerprint::of(self.question.as_ref())?;
        let mut futures = Vec::with_capacity(questions.len());
        for question in questions {
            let to = Fingerprint::of(question.as_ref())?;
            self.database
                .record_dependency(&from, &to)
                .await
                .map_err(|e| BError::database(e.to_string()))?;
            futures.push(self.dispatcher.ask(question).await?);
        }
        b_future::join(futures, self.future.run_loop())
    }

    /// Convenience for `need` with a single dependency.
    pub async fn need_one(&self, question: Box<dyn QuestionValue>) -> BResult<AnswerFuture> {
        self.need(vec![question]).await
    }

    /// Asks the question to answer itself via `query_answer`; resolves this
    /// context's future with the result, or fails it with `Unanswerable` if
    /// the question has no native answer.
    pub fn succeed(self) -> BResult<()> {
        match self.question.query_answer()? {
            Some(answer) => self.future.resolve(answer),
            None => {
                let type_name = self.question.vtable().type_name.to_string();
                self.future.fail(BError::Unanswerable(type_name))
            }
        }
    }

    /// Resolves this context's future with an answer the rule has already
    /// computed.
    pub fn succeed_answer(self, answer: Box<dyn AnswerValue>) -> BResult<()> {
        self.future.resolve(answer)
    }

    /// Fails this context's future with `error`.
    pub fn fail(self, error: BError) -> BResult<()> {
        self.future.fail(error)
    }
}
