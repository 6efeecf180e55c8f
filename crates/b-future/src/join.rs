//! The `join` combinator: wait on N child futures, resolve with their N
//! answers in declaration order.

use std::sync::Arc;

use b_runloop::RunLoop;
use b_shared::{BError, BResult};

use crate::future::{AnswerFuture, FutureState};

/// Joins `children` into one future of arity `children.len()`. Each child's
/// eventual answer lands in the output future's slot matching the child's
/// position in `children`, regardless of the order the children actually
/// resolve in. If any child fails, the output future fails with that
/// child's error and the remaining children's callbacks become no-ops
/// (their slots are simply never read once the output is terminal).
///
/// Precondition: `children` is non-empty; joining zero futures is a
/// precondition violation (the reference implementation rejects this case
/// rather than returning a trivially-resolved arity-0 future).
pub fn join(children: Vec<AnswerFuture>, run_loop: Arc<dyn RunLoop>) -> BResult<AnswerFuture> {
    if children.is_empty() {
        return Err(BError::precondition("join requires at least one future"));
    }

    let out = AnswerFuture::pending(children.len(), run_loop);
    for (i, child) in children.into_iter().enumerate() {
        let out = out.clone();
        child.add_callback(Box::new(move |child| match child.state() {
            FutureState::Resolved => {
                let answer = child.answer(0)?;
                out.resolve_slot(i, answer)
            }
            FutureState::Failed => {
                let error = child.error()?;
                out.fail_slot(i, error)
            }
            FutureState::Pending => Err(BError::precondition(
                "join callback invoked on a still-Pending child",
            )),
        }));
    }
    Ok(out)
}
