//! The `Database` trait: the key/value surface `b-engine` and `b-context`
//! consume. The core does not depend on any specific backing store; see
//! [`crate::memory::InMemoryDatabase`] and [`crate::postgres::PostgresDatabase`]
//! for the two implementations this workspace carries.

use b_shared::{AnswerValue, AnswerVTable};

use crate::error::DbResult;
use crate::fingerprint::Fingerprint;

/// The persistence surface consumed by the dispatcher.
#[async_trait::async_trait]
pub trait Database: Send + Sync + std::fmt::Debug {
    /// Persists a dependency edge from a parent question to a child
    /// question it declared via `need`.
    async fn record_dependency(&self, from: &Fingerprint, to: &Fingerprint) -> DbResult<()>;

    /// Persists a question's resolved answer under its fingerprint.
    async fn record_answer(
        &self,
        key: &Fingerprint,
        answer: &dyn AnswerValue,
    ) -> DbResult<()>;

    /// Looks up a previously recorded answer, deserializing it with the
    /// vtable of the answer type the caller expects (taken from the
    /// question's own vtable).
    async fn look_up_answer(
        &self,
        key: &Fingerprint,
        answer_vtable: AnswerVTable,
    ) -> DbResult<Option<Box<dyn AnswerValue>>>;

    /// Invalidates stored answers whose recorded inputs no longer match
    /// reality. Semantics are implementation-defined; the default does
    /// nothing. Rechecks never invoke rules themselves — callers re-`ask`
    /// anything this invalidates.
    async fn check_all(&self, _vtables: &[b_shared::TypeUuid]) -> DbResult<()> {
        Ok(())
    }
}
