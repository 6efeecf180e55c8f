//! `JoinFilesRule`: the one rule this demo registers, the Rust rendering of
//! `Examples/JoinFiles/Source/Main.c`'s `dispatch_question_`.
//!
//! Any part path answers itself natively (`ctx.succeed()` — the file already
//! exists on disk). The joined path has no native answer, so its question is
//! routed here: the rule declares the parts as dependencies via `ctx.need`,
//! concatenates them once every part has resolved, and then calls
//! `ctx.succeed()` rather than `ctx.succeed_answer()` — the joined file's sum
//! is computed by re-reading the file `query_answer` just wrote, exactly the
//! split the core design calls out between "rule already has the answer" and
//! "question answers itself after a rule produces its input".

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use b_context::AnswerContext;
use b_engine::Main;
use b_shared::{BError, BResult, QuestionValue};

use crate::question::FileContentSumQuestion;

#[derive(Debug)]
pub struct JoinFilesRule {
    pub parts: Vec<PathBuf>,
    pub joined: PathBuf,
}

impl JoinFilesRule {
    fn build_joined(&self) -> std::io::Result<()> {
        let mut joined = Vec::new();
        for part in &self.parts {
            joined.extend(std::fs::read(part)?);
        }
        std::fs::write(&self.joined, joined)
    }
}

#[async_trait]
impl b_engine::Rule for JoinFilesRule {
    async fn invoke(&self, _main: Arc<Main>, ctx: AnswerContext) -> BResult<()> {
        let question = ctx
            .question()
            .as_any()
            .downcast_ref::<FileContentSumQuestion>()
            .expect("JoinFilesRule only ever answers FileContentSumQuestion")
            .0
            .clone();

        info!(path = %question.display(), "dispatch_question");

        if question != self.joined {
            // A part file already exists on disk; let it answer itself.
            return ctx.succeed();
        }

        let part_questions: Vec<Box<dyn QuestionValue>> = self
            .parts
            .iter()
            .cloned()
            .map(|p| Box::new(FileContentSumQuestion(p)) as Box<dyn QuestionValue>)
            .collect();

        let parts_future = ctx.need(part_questions).await?;
        if let Err(err) = parts_future.wait().await {
            return ctx.fail(BError::rule_failure(err.to_string()));
        }

        if let Err(e) = self.build_joined() {
            return ctx.fail(e.into());
        }

        ctx.succeed()
    }
}
