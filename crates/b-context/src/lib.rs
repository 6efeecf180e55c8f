//! `AnswerContext`, the one-shot handle a dispatcher passes to a rule
//! invocation, and the `Dispatcher` seam it calls back into.

pub mod context;
pub mod dispatcher;

pub use context::AnswerContext;
pub use dispatcher::Dispatcher;
