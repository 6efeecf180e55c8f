//! `AnswerFuture`: a reference-counted Pending/Resolved/Failed cell, and
//! `join`, the combinator that waits on N children and resolves with their
//! N answers in declaration order.

pub mod future;
pub mod join;

pub use future::{AnswerFuture, Callback, FutureState, PersistHook};
pub use join::join;
