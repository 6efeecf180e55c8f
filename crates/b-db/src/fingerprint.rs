//! Cache keys: the pair `(type UUID, serialized question bytes)` that
//! identifies a question regardless of which process asked it.

use b_shared::{serialize_to_vec, BResult, QuestionValue, TypeUuid};

/// A question's cache key. Two questions with the same concrete type and
/// the same serialized bytes are the same question for caching purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub type_uuid: TypeUuid,
    pub question_bytes: Vec<u8>,
}

impl Fingerprint {
    /// Computes the fingerprint of a type-erased question by serializing
    /// it through its own vtable.
    pub fn of(question: &dyn QuestionValue) -> BResult<Self> {
        let type_uuid = question.vtable().uuid;
        let question_bytes = serialize_to_vec(|sink| question.serialize(sink))?;
        Ok(Self {
            type_uuid,
            question_bytes,
        })
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            self.type_uuid,
            hex_encode(&self.question_bytes)
        )
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
