//! # Question protocol
//!
//! Mirrors [`crate::answer`]'s erasure scheme. A concrete question type
//! implements [`TypedQuestion`]; a blanket impl produces the object-safe
//! [`QuestionValue`] the dispatcher actually stores and dispatches through.
//!
//! Each question type carries a pointer (here, a [`AnswerVTable`] value) to
//! its answer type, so the dispatcher and database layer can choose the
//! correct deserializer when reading a cached answer back.

use std::any::Any;
use std::fmt::Debug;

use crate::answer::{answer_vtable, AnswerValue, AnswerVTable, TypedAnswer};
use crate::error::BResult;
use crate::serialize::{ByteSink, ByteSource};
use crate::uuid::TypeUuid;

/// Object-safe, type-erased question value.
pub trait QuestionValue: Debug + Send + Sync {
    fn equal(&self, other: &dyn QuestionValue) -> bool;
    fn replicate(&self) -> Box<dyn QuestionValue>;
    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()>;

    /// Attempt to derive an answer directly from current system state.
    /// `Ok(None)` means "no native answer; the dispatcher must invoke a
    /// rule". Must be side-effect-free with respect to the engine.
    fn query_answer(&self) -> BResult<Option<Box<dyn AnswerValue>>>;

    /// This question's vtable, including its paired answer vtable.
    fn vtable(&self) -> QuestionVTable;

    fn as_any(&self) -> &dyn Any;
}

/// A `Copy` table of identity and dispatch information for a concrete
/// question type, the Rust analogue of `B_QuestionVTable`.
#[derive(Clone, Copy)]
pub struct QuestionVTable {
    pub uuid: TypeUuid,
    pub type_name: &'static str,
    pub answer_vtable: AnswerVTable,
    pub deserialize: fn(&mut dyn ByteSource) -> BResult<Box<dyn QuestionValue>>,
}

impl Debug for QuestionVTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionVTable")
            .field("uuid", &self.uuid)
            .field("type_name", &self.type_name)
            .field("answer_vtable", &self.answer_vtable)
            .finish()
    }
}

impl PartialEq for QuestionVTable {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

/// Ergonomic trait implemented by concrete question types.
pub trait TypedQuestion: Debug + Clone + PartialEq + Send + Sync + 'static {
    /// The answer type this question produces.
    type Answer: TypedAnswer;

    fn type_uuid() -> TypeUuid;

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()>;
    fn deserialize(source: &mut dyn ByteSource) -> BResult<Self>
    where
        Self: Sized;

    /// Side-effect-free attempt to answer directly from current state.
    fn query_answer(&self) -> BResult<Option<Self::Answer>>;
}

impl<Q: TypedQuestion> QuestionValue for Q {
    fn equal(&self, other: &dyn QuestionValue) -> bool {
        other
            .as_any()
            .downcast_ref::<Q>()
            .is_some_and(|o| self == o)
    }

    fn replicate(&self) -> Box<dyn QuestionValue> {
        Box::new(self.clone())
    }

    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
        TypedQuestion::serialize(self, sink)
    }

    fn query_answer(&self) -> BResult<Option<Box<dyn AnswerValue>>> {
        Ok(TypedQuestion::query_answer(self)?.map(|a| Box::new(a) as Box<dyn AnswerValue>))
    }

    fn vtable(&self) -> QuestionVTable {
        question_vtable::<Q>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Build the [`QuestionVTable`] for a concrete [`TypedQuestion`] type.
pub fn question_vtable<Q: TypedQuestion>() -> QuestionVTable {
    QuestionVTable {
        uuid: Q::type_uuid(),
        type_name: Q::type_name(),
        answer_vtable: answer_vtable::<Q::Answer>(),
        deserialize: |source| Ok(Box::new(Q::deserialize(source)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::TypedAnswer;
    use crate::serialize::{
        deserialize_data_and_size_8_be, serialize_data_and_size_8_be, InMemoryByteSink,
        InMemoryByteSource,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct SumAnswer(u64);
    impl TypedAnswer for SumAnswer {
        fn type_uuid() -> TypeUuid {
            TypeUuid::from_uuid(uuid::uuid!("11111111-1111-1111-1111-111111111111"))
        }
        fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
            crate::serialize::serialize_8_be(sink, self.0)
        }
        fn deserialize(source: &mut dyn ByteSource) -> BResult<Self> {
            Ok(SumAnswer(crate::serialize::deserialize_8_be(source)?))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct PathQuestion(String);
    impl TypedQuestion for PathQuestion {
        type Answer = SumAnswer;

        fn type_uuid() -> TypeUuid {
            TypeUuid::from_uuid(uuid::uuid!("33333333-3333-3333-3333-333333333333"))
        }
        fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
            serialize_data_and_size_8_be(sink, self.0.as_bytes())
        }
        fn deserialize(source: &mut dyn ByteSource) -> BResult<Self> {
            let bytes = deserialize_data_and_size_8_be(source)?;
            String::from_utf8(bytes)
                .map(PathQuestion)
                .map_err(|e| crate::error::BError::malformed(e.to_string()))
        }
        fn query_answer(&self) -> BResult<Option<Self::Answer>> {
            Ok(None)
        }
    }

    #[test]
    fn serialize_then_deserialize_is_identity() {
        let q = PathQuestion("/tmp/demo".to_string());
        let mut sink = InMemoryByteSink::new();
        q.serialize(&mut sink).unwrap();
        let bytes = sink.finalize();

        let mut source = InMemoryByteSource::new(&bytes);
        let restored = PathQuestion::deserialize(&mut source).unwrap();
        assert_eq!(q, restored);
    }

    #[test]
    fn replicate_equals_original() {
        let q: Box<dyn QuestionValue> = Box::new(PathQuestion("/tmp/demo".to_string()));
        let replica = q.replicate();
        assert!(q.equal(replica.as_ref()));
    }

    #[test]
    fn vtable_carries_matching_answer_vtable() {
        let vtable = question_vtable::<PathQuestion>();
        assert_eq!(vtable.uuid, PathQuestion::type_uuid());
        assert_eq!(vtable.answer_vtable.uuid, SumAnswer::type_uuid());
    }

    #[test]
    fn query_answer_none_means_ask_a_rule() {
        let q = PathQuestion("/tmp/demo".to_string());
        assert!(TypedQuestion::query_answer(&q).unwrap().is_none());
    }
}
