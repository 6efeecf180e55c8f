//! `EngineError`: the top-level error composing every crate boundary this
//! engine touches, mirroring `tasker-client::ClientError`'s
//! `#[from]`-composition of `tasker_shared::TaskerError` into one enum
//! callers match on.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] b_shared::BError),

    #[error(transparent)]
    Database(#[from] b_db::DbError),

    #[error(transparent)]
    RunLoop(#[from] b_runloop::RunLoopError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl EngineError {
    /// Folds this error down to a [`b_shared::BError`] for callers that only
    /// need to fail an `AnswerFuture` and don't care which layer produced it.
    pub fn into_core(self) -> b_shared::BError {
        match self {
            EngineError::Core(e) => e,
            other => b_shared::BError::rule_failure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_composes_through_from() {
        let db_err = b_db::DbError::backend("connection refused");
        let engine_err: EngineError = db_err.into();
        assert!(matches!(engine_err, EngineError::Database(_)));
    }

    #[test]
    fn into_core_folds_non_core_errors_into_rule_failure() {
        let db_err = b_db::DbError::backend("timeout");
        let engine_err: EngineError = db_err.into();
        let core = engine_err.into_core();
        assert!(matches!(core, b_shared::BError::RuleFailure(_)));
    }

    #[test]
    fn into_core_preserves_a_core_error_unchanged() {
        let engine_err: EngineError = b_shared::BError::precondition("bad state").into();
        let core = engine_err.into_core();
        assert!(core.is_precondition_violation());
    }
}
