//! # Answer protocol
//!
//! An `Answer` is an opaque value paired with each `Question` type. The
//! engine needs to hold, compare, copy, and persist answers of many
//! different concrete types at once (the dispatcher's cache, the database
//! layer, a join future's answer array) without its own code being generic
//! over every question type a rule author defines. We get there the same
//! way the original C core does — a vtable of function pointers — except
//! the Rust vtable is a `Copy` struct of `fn` pointers rather than a
//! hand-rolled struct of raw pointers, and the opaque value is a
//! `Box<dyn AnswerValue>` rather than a `void *`.
//!
//! Concrete answer types implement [`TypedAnswer`], a small, ergonomic,
//! `Sized`-bound trait; a blanket impl turns every `TypedAnswer` into an
//! object-safe [`AnswerValue`] so the engine can store `Box<dyn AnswerValue>`
//! values interchangeably.

use std::any::Any;
use std::fmt::Debug;

use crate::error::BResult;
use crate::serialize::{ByteSink, ByteSource};
use crate::uuid::TypeUuid;

/// Object-safe, type-erased answer value.
///
/// Implemented automatically for every [`TypedAnswer`]; engine code should
/// depend on this trait (and [`AnswerVTable`]), never on `TypedAnswer`
/// directly, so it stays agnostic to concrete answer types.
pub trait AnswerValue: Debug + Send + Sync {
    /// Structural equality against another answer of (expected) the same
    /// concrete type. Returns `false`, never panics, if the concrete types
    /// differ.
    fn equal(&self, other: &dyn AnswerValue) -> bool;

    /// Deep copy. Never aliases the original.
    fn replicate(&self) -> Box<dyn AnswerValue>;

    /// Binary serialization, big-endian, length-prefixed blobs.
    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()>;

    /// This answer's paired type UUID — used by the dispatcher to verify it
    /// has the right vtable before writing to the database.
    fn type_uuid(&self) -> TypeUuid;

    /// Downcast support for concrete question types' `query_answer` and for
    /// [`AnswerValue::equal`]'s own implementation.
    fn as_any(&self) -> &dyn Any;
}

/// A `Copy` table of free functions needed to deserialize and identify a
/// concrete answer type, the Rust analogue of the C `B_AnswerVTable`.
///
/// Unlike the C original, `deallocate` is not part of the vtable: dropping
/// the owning `Box<dyn AnswerValue>` is sufficient in Rust.
#[derive(Clone, Copy)]
pub struct AnswerVTable {
    pub uuid: TypeUuid,
    pub type_name: &'static str,
    pub deserialize: fn(&mut dyn ByteSource) -> BResult<Box<dyn AnswerValue>>,
}

impl Debug for AnswerVTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerVTable")
            .field("uuid", &self.uuid)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Ergonomic trait implemented by concrete answer types.
///
/// Equality, replication (via `Clone`), serialization and deserialization
/// are defined directly on the concrete type; [`AnswerValue`] and
/// [`AnswerVTable`] are derived from it mechanically (see
/// [`answer_vtable`]).
pub trait TypedAnswer: Debug + Clone + PartialEq + Send + Sync + 'static {
    /// This type's stable 16-byte identifier.
    fn type_uuid() -> TypeUuid;

    /// A short name for diagnostics; defaults to `std::any::type_name`.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()>;
    fn deserialize(source: &mut dyn ByteSource) -> BResult<Self>
    where
        Self: Sized;
}

impl<A: TypedAnswer> AnswerValue for A {
    fn equal(&self, other: &dyn AnswerValue) -> bool {
        other
            .as_any()
            .downcast_ref::<A>()
            .is_some_and(|o| self == o)
    }

    fn replicate(&self) -> Box<dyn AnswerValue> {
        Box::new(self.clone())
    }

    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
        TypedAnswer::serialize(self, sink)
    }

    fn type_uuid(&self) -> TypeUuid {
        A::type_uuid()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Build the [`AnswerVTable`] for a concrete [`TypedAnswer`] type.
pub fn answer_vtable<A: TypedAnswer>() -> AnswerVTable {
    AnswerVTable {
        uuid: A::type_uuid(),
        type_name: A::type_name(),
        deserialize: |source| Ok(Box::new(A::deserialize(source)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{deserialize_8_be, serialize_8_be, InMemoryByteSink, InMemoryByteSource};

    #[derive(Debug, Clone, PartialEq)]
    struct SumAnswer(u64);

    impl TypedAnswer for SumAnswer {
        fn type_uuid() -> TypeUuid {
            TypeUuid::from_uuid(uuid::uuid!("11111111-1111-1111-1111-111111111111"))
        }

        fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
            serialize_8_be(sink, self.0)
        }

        fn deserialize(source: &mut dyn ByteSource) -> BResult<Self> {
            Ok(SumAnswer(deserialize_8_be(source)?))
        }
    }

    #[test]
    fn replication_is_equal_but_not_the_same_allocation() {
        let original = SumAnswer(0xC6);
        let erased: Box<dyn AnswerValue> = Box::new(original.clone());
        let replica = erased.replicate();
        assert!(erased.equal(replica.as_ref()));
    }

    #[test]
    fn equal_returns_false_for_mismatched_concrete_type() {
        #[derive(Debug, Clone, PartialEq)]
        struct OtherAnswer(u8);
        impl TypedAnswer for OtherAnswer {
            fn type_uuid() -> TypeUuid {
                TypeUuid::from_uuid(uuid::uuid!("22222222-2222-2222-2222-222222222222"))
            }
            fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
                crate::serialize::serialize_1(sink, self.0)
            }
            fn deserialize(source: &mut dyn ByteSource) -> BResult<Self> {
                Ok(OtherAnswer(crate::serialize::deserialize_1(source)?))
            }
        }

        let a: Box<dyn AnswerValue> = Box::new(SumAnswer(1));
        let b: Box<dyn AnswerValue> = Box::new(OtherAnswer(1));
        assert!(!a.equal(b.as_ref()));
    }

    #[test]
    fn vtable_deserializes_via_type_erased_function_pointer() {
        let vtable = answer_vtable::<SumAnswer>();
        let mut sink = InMemoryByteSink::new();
        serialize_8_be(&mut sink, 0xC6).unwrap();
        let bytes = sink.finalize();
        let mut source = InMemoryByteSource::new(&bytes);
        let answer = (vtable.deserialize)(&mut source).unwrap();
        assert_eq!(answer.type_uuid(), SumAnswer::type_uuid());
        assert!(answer.equal(&SumAnswer(0xC6)));
    }
}
