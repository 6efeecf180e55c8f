//! `FileContentSumQuestion`: "what is the sum of the bytes in this file?" —
//! the Rust rendering of the original `FileQuestion.c`'s "TODO(strager):
//! something better than summation" content hash.
//!
//! `query_answer` returns `Ok(None)` when the file does not exist yet
//! (nothing to natively answer; a rule must produce it first), matching the
//! original's `ENOENT` handling.

use std::path::PathBuf;

use b_shared::{BResult, ByteSink, ByteSource, TypeUuid, TypedAnswer, TypedQuestion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContentSumAnswer(pub u64);

impl TypedAnswer for FileContentSumAnswer {
    fn type_uuid() -> TypeUuid {
        TypeUuid::from_uuid(uuid::uuid!("d1f5a001-0000-4000-8000-000000000001"))
    }

    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
        b_shared::serialize_8_be(sink, self.0)
    }

    fn deserialize(source: &mut dyn ByteSource) -> BResult<Self> {
        Ok(FileContentSumAnswer(b_shared::deserialize_8_be(source)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContentSumQuestion(pub PathBuf);

impl TypedQuestion for FileContentSumQuestion {
    type Answer = FileContentSumAnswer;

    fn type_uuid() -> TypeUuid {
        TypeUuid::from_uuid(uuid::uuid!("d1f5a002-0000-4000-8000-000000000002"))
    }

    fn serialize(&self, sink: &mut dyn ByteSink) -> BResult<()> {
        b_shared::serialize_data_and_size_8_be(sink, self.0.to_string_lossy().as_bytes())
    }

    fn deserialize(source: &mut dyn ByteSource) -> BResult<Self> {
        let bytes = b_shared::deserialize_data_and_size_8_be(source)?;
        let path = String::from_utf8(bytes)
            .map_err(|e| b_shared::BError::malformed(e.to_string()))?;
        Ok(FileContentSumQuestion(PathBuf::from(path)))
    }

    /// Reads the file and sums its bytes. `Ok(None)` if the file does not
    /// exist yet — the dispatcher must invoke a rule to produce it first.
    fn query_answer(&self) -> BResult<Option<Self::Answer>> {
        match std::fs::read(&self.0) {
            Ok(bytes) => {
                let sum = bytes.iter().fold(0u64, |acc, b| acc + u64::from(*b));
                Ok(Some(FileContentSumAnswer(sum)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use b_shared::{InMemoryByteSink, InMemoryByteSource};

    #[test]
    fn serialize_then_deserialize_is_identity() {
        let q = FileContentSumQuestion(PathBuf::from("/tmp/one.txt"));
        let mut sink = InMemoryByteSink::new();
        TypedQuestion::serialize(&q, &mut sink).unwrap();
        let bytes = sink.finalize();
        let mut source = InMemoryByteSource::new(&bytes);
        let restored = FileContentSumQuestion::deserialize(&mut source).unwrap();
        assert_eq!(q, restored);
    }

    #[test]
    fn missing_file_has_no_native_answer() {
        let q = FileContentSumQuestion(PathBuf::from("/definitely/does/not/exist/xyz"));
        assert!(q.query_answer().unwrap().is_none());
    }

    #[test]
    fn content_sum_matches_byte_arithmetic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        std::fs::write(&path, [0x41u8, 0x42, 0x43]).unwrap();

        let q = FileContentSumQuestion(path);
        let answer = q.query_answer().unwrap().expect("file exists");
        assert_eq!(answer.0, 0xC6);
    }
}
