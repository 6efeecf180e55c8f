//! # Core Error Types
//!
//! Unified error handling for the question/answer protocol and serialization
//! helpers. Mirrors the named-variant, `#[from]`-composed style used
//! throughout this workspace's client and orchestration error types.

use thiserror::Error;

/// Result type used throughout `b-shared` and the crates built on top of it.
pub type BResult<T> = Result<T, BError>;

/// Errors produced by the question/answer protocol, serialization, and the
/// dispatcher built on top of them.
///
/// Variants map directly onto the error kinds named in the core design:
/// out-of-memory, malformed/truncated serialized data, rule failure,
/// unanswerable questions, and precondition violations.
#[derive(Debug, Error)]
pub enum BError {
    /// Allocation failed. Fatal to the current operation; the caller
    /// surfaces this to the nearest future.
    #[error("allocation failed: {0}")]
    OutOfMemory(String),

    /// Deserialization got a well-typed but inconsistent payload.
    #[error("malformed serialized data: {0}")]
    Malformed(String),

    /// Deserialization ran out of input before producing a complete value.
    /// Distinct from `Malformed` so callers can distinguish "needs more
    /// bytes" from "will never parse".
    #[error("truncated serialized data: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A rule called `fail` explicitly.
    #[error("rule failed: {0}")]
    RuleFailure(String),

    /// `query_answer` returned `None` when the dispatcher expected an
    /// answer (i.e. `succeed` was called but the question has no native
    /// answer and must be built by a rule).
    #[error("question {0} has no native answer and must be answered by a rule")]
    Unanswerable(String),

    /// A precondition was violated (e.g. `succeed` called twice on the same
    /// context, `resolve` called on an already-terminal future). These are
    /// bugs in the calling code, not recoverable run-time conditions.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The root future returned from `run()` without ever reaching a
    /// terminal state — indicative of a dependency cycle or a rule that
    /// never resolved its context.
    #[error("future never resolved (possible dependency cycle)")]
    NeverResolved,

    /// Wraps an error surfaced by a `Database` implementation.
    #[error("database error: {0}")]
    Database(String),

    /// Wraps an I/O error encountered by a concrete question's
    /// `query_answer` (e.g. reading a file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BError {
    /// Build a [`BError::Malformed`] from any displayable reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Build a [`BError::RuleFailure`] from any displayable reason.
    pub fn rule_failure(reason: impl Into<String>) -> Self {
        Self::RuleFailure(reason.into())
    }

    /// Build a [`BError::Precondition`] from any displayable reason.
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition(reason.into())
    }

    /// Build a [`BError::Database`] from any displayable reason.
    pub fn database(reason: impl Into<String>) -> Self {
        Self::Database(reason.into())
    }

    /// Whether this error class is specific to malformed/truncated wire
    /// data, as opposed to a rule or dispatcher failure.
    #[must_use]
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::Truncated { .. })
    }

    /// Whether this error represents a programming-error precondition
    /// violation rather than a recoverable run-time failure. The reference
    /// implementation treats these as bugs; callers embedding this engine
    /// may choose to `panic!` on them instead of propagating.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}
