//! Errors raised by [`crate::Database`] implementations.

use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// Answer or question bytes failed to (de)serialize on the way in or
    /// out of storage.
    #[error(transparent)]
    Serialization(#[from] b_shared::BError),

    /// The backing store reported a failure (connection, constraint,
    /// migration).
    #[error("database backend error: {0}")]
    Backend(String),
}

impl DbError {
    pub fn backend(reason: impl std::fmt::Display) -> Self {
        Self::Backend(reason.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
