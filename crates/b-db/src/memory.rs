//! An in-memory [`Database`] implementation, useful for tests and for
//! single-shot invocations of the engine that don't need a persistent
//! cache across runs.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use b_shared::{serialize_to_vec, AnswerValue, AnswerVTable};

use crate::error::DbResult;
use crate::fingerprint::Fingerprint;
use crate::traits::Database;

#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    answers: Mutex<HashMap<Fingerprint, Vec<u8>>>,
    dependencies: Mutex<HashSet<(Fingerprint, Fingerprint)>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a dependency edge from `from` to `to` has been
    /// recorded. Used by tests asserting invariant 6
    /// (dependency-before-resume).
    pub fn has_dependency(&self, from: &Fingerprint, to: &Fingerprint) -> bool {
        self.dependencies
            .lock()
            .expect("dependency set mutex poisoned")
            .contains(&(from.clone(), to.clone()))
    }

    pub fn answer_count(&self) -> usize {
        self.answers.lock().expect("answer map mutex poisoned").len()
    }
}

#[async_trait::async_trait]
impl Database for InMemoryDatabase {
    async fn record_dependency(&self, from: &Fingerprint, to: &Fingerprint) -> DbResult<()> {
        self.dependencies
            .lock()
            .expect("dependency set mutex poisoned")
            .insert((from.clone(), to.clone()));
        Ok(())
    }

    async fn record_answer(&self, key: &Fingerprint, answer: &dyn AnswerValue) -> DbResult<()> {
        let bytes = serialize_to_vec(|sink| answer.serialize(sink))?;
        self.answers
            .lock()
            .expect("answer map mutex poisoned")
            .insert(key.clone(), bytes);
        Ok(())
    }

    async fn look_up_answer(
        &self,
        key: &Fingerprint,
        answer_vtable: AnswerVTable,
    ) -> DbResult<Option<Box<dyn AnswerValue>>> {
        let bytes = self
            .answers
            .lock()
            .expect("answer map mutex poisoned")
            .get(key)
            .cloned();
        match bytes {
            Some(bytes) => {
                let mut source = b_shared::InMemoryByteSource::new(&bytes);
                let answer = (answer_vtable.deserialize)(&mut source)?;
                Ok(Some(answer))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use b_shared::{answer_vtable, ByteSink, ByteSource, TypeUuid, TypedAnswer};

    #[derive(Debug, Clone, PartialEq)]
    struct DemoAnswer(u64);
    impl TypedAnswer for DemoAnswer {
        fn type_uuid() -> TypeUuid {
            TypeUuid::from_uuid(uuid::uuid!("88888888-8888-8888-8888-888888888888"))
        }
        fn serialize(&self, sink: &mut dyn ByteSink) -> b_shared::BResult<()> {
            b_shared::serialize_8_be(sink, self.0)
        }
        fn deserialize(source: &mut dyn ByteSource) -> b_shared::BResult<Self> {
            Ok(DemoAnswer(b_shared::deserialize_8_be(source)?))
        }
    }

    fn fingerprint(tag: &str) -> Fingerprint {
        Fingerprint {
            type_uuid: TypeUuid::from_uuid(uuid::uuid!("99999999-9999-9999-9999-999999999999")),
            question_bytes: tag.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn records_and_looks_up_an_answer() {
        let db = InMemoryDatabase::new();
        let key = fingerprint("Q1");
        db.record_answer(&key, &DemoAnswer(0xC6)).await.unwrap();

        let looked_up = db
            .look_up_answer(&key, answer_vtable::<DemoAnswer>())
            .await
            .unwrap()
            .expect("answer should be present");
        assert!(looked_up.equal(&DemoAnswer(0xC6)));
    }

    #[tokio::test]
    async fn missing_answer_is_none() {
        let db = InMemoryDatabase::new();
        let key = fingerprint("Q_missing");
        let looked_up = db
            .look_up_answer(&key, answer_vtable::<DemoAnswer>())
            .await
            .unwrap();
        assert!(looked_up.is_none());
    }

    #[tokio::test]
    async fn dependency_edges_are_recorded() {
        let db = InMemoryDatabase::new();
        let parent = fingerprint("Q_joined");
        let child = fingerprint("Q_part");
        assert!(!db.has_dependency(&parent, &child));
        db.record_dependency(&parent, &child).await.unwrap();
        assert!(db.has_dependency(&parent, &child));
    }
}
