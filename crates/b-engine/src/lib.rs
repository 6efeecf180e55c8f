//! `b_engine::Main`: the process-wide dispatcher wiring a [`Rule`], a
//! [`b_db::Database`], and a [`b_runloop::RunLoop`] into the question/answer
//! protocol `b-shared`, `b-future`, and `b-context` define.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod rule;

pub use config::{EngineConfig, RunLoopBackend};
pub use dispatcher::Main;
pub use error::{EngineError, EngineResult};
pub use rule::Rule;
