//! # Byte-sink / byte-source serialization helpers
//!
//! All multi-byte integers are big-endian. Blobs are length-prefixed with
//! an 8-byte big-endian length. `deserialize_*` reports insufficient input
//! ([`BError::Truncated`]) as an error distinct from malformed input
//! ([`BError::Malformed`]).

use crate::error::{BError, BResult};

/// Destination for serialized bytes.
///
/// The reference implementation's in-memory sink grows a `Vec<u8>`; other
/// sinks (e.g. writing straight to a database value buffer) can implement
/// this trait directly.
pub trait ByteSink {
    fn write_bytes(&mut self, data: &[u8]) -> BResult<()>;
}

/// Source of bytes to deserialize from. Reads are sequential and consume
/// the source; there is no seek.
pub trait ByteSource {
    /// Returns the number of bytes remaining.
    fn remaining(&self) -> usize;

    /// Reads exactly `len` bytes, or fails with [`BError::Truncated`] if
    /// fewer remain.
    fn read_bytes(&mut self, len: usize) -> BResult<&[u8]>;
}

/// An in-memory byte sink backed by a growable buffer.
///
/// A zero-length write still returns a live (non-empty-capacity-bearing)
/// buffer reference, matching the boundary behavior called out for the C
/// original's in-memory sink.
#[derive(Debug, Default, Clone)]
pub struct InMemoryByteSink {
    buffer: Vec<u8>,
}

impl InMemoryByteSink {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Consume the sink, returning the accumulated bytes.
    #[must_use]
    pub fn finalize(self) -> Vec<u8> {
        self.buffer
    }
}

impl ByteSink for InMemoryByteSink {
    fn write_bytes(&mut self, data: &[u8]) -> BResult<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }
}

/// An in-memory byte source over a borrowed slice.
#[derive(Debug, Clone, Copy)]
pub struct InMemoryByteSource<'a> {
    data: &'a [u8],
}

impl<'a> InMemoryByteSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl ByteSource for InMemoryByteSource<'_> {
    fn remaining(&self) -> usize {
        self.data.len()
    }

    fn read_bytes(&mut self, len: usize) -> BResult<&[u8]> {
        if self.data.len() < len {
            return Err(BError::Truncated {
                expected: len,
                actual: self.data.len(),
            });
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }
}

/// Serializes one byte.
pub fn serialize_1(sink: &mut dyn ByteSink, value: u8) -> BResult<()> {
    sink.write_bytes(&[value])
}

/// Serializes two bytes in big-endian.
pub fn serialize_2_be(sink: &mut dyn ByteSink, value: u16) -> BResult<()> {
    sink.write_bytes(&value.to_be_bytes())
}

/// Serializes four bytes in big-endian.
pub fn serialize_4_be(sink: &mut dyn ByteSink, value: u32) -> BResult<()> {
    sink.write_bytes(&value.to_be_bytes())
}

/// Serializes eight bytes in big-endian.
pub fn serialize_8_be(sink: &mut dyn ByteSink, value: u64) -> BResult<()> {
    sink.write_bytes(&value.to_be_bytes())
}

/// Serializes raw bytes with no length prefix.
pub fn serialize_bytes(sink: &mut dyn ByteSink, data: &[u8]) -> BResult<()> {
    sink.write_bytes(data)
}

/// Serializes an 8-byte big-endian length followed by `data`.
pub fn serialize_data_and_size_8_be(sink: &mut dyn ByteSink, data: &[u8]) -> BResult<()> {
    let len: u64 = data
        .len()
        .try_into()
        .map_err(|_| BError::OutOfMemory("blob length exceeds u64".to_string()))?;
    serialize_8_be(sink, len)?;
    serialize_bytes(sink, data)
}

/// Deserializes one byte.
pub fn deserialize_1(source: &mut dyn ByteSource) -> BResult<u8> {
    Ok(source.read_bytes(1)?[0])
}

/// Deserializes two big-endian bytes.
pub fn deserialize_2_be(source: &mut dyn ByteSource) -> BResult<u16> {
    let bytes = source.read_bytes(2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Deserializes four big-endian bytes.
pub fn deserialize_4_be(source: &mut dyn ByteSource) -> BResult<u32> {
    let bytes = source.read_bytes(4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Deserializes eight big-endian bytes.
pub fn deserialize_8_be(source: &mut dyn ByteSource) -> BResult<u64> {
    let bytes = source.read_bytes(8)?;
    let mut array = [0u8; 8];
    array.copy_from_slice(bytes);
    Ok(u64::from_be_bytes(array))
}

/// Deserializes an 8-byte big-endian length followed by that many bytes.
///
/// An empty blob (length 0) decodes to an empty `Vec`, not an error.
pub fn deserialize_data_and_size_8_be(source: &mut dyn ByteSource) -> BResult<Vec<u8>> {
    let len = deserialize_8_be(source)?;
    let len: usize = len
        .try_into()
        .map_err(|_| BError::OutOfMemory("blob length exceeds usize".to_string()))?;
    Ok(source.read_bytes(len)?.to_vec())
}

/// Serializes a question-or-answer payload to an owned `Vec<u8>` using an
/// in-memory sink. Convenience wrapper around [`InMemoryByteSink`].
pub fn serialize_to_vec(f: impl FnOnce(&mut dyn ByteSink) -> BResult<()>) -> BResult<Vec<u8>> {
    let mut sink = InMemoryByteSink::new();
    f(&mut sink)?;
    Ok(sink.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_big_endian_integers() {
        let mut sink = InMemoryByteSink::new();
        serialize_2_be(&mut sink, 0xABCD).unwrap();
        serialize_4_be(&mut sink, 0xDEAD_BEEF).unwrap();
        serialize_8_be(&mut sink, 0x0123_4567_89AB_CDEF).unwrap();
        let bytes = sink.finalize();

        let mut source = InMemoryByteSource::new(&bytes);
        assert_eq!(deserialize_2_be(&mut source).unwrap(), 0xABCD);
        assert_eq!(deserialize_4_be(&mut source).unwrap(), 0xDEAD_BEEF);
        assert_eq!(deserialize_8_be(&mut source).unwrap(), 0x0123_4567_89AB_CDEF);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn empty_blob_round_trips_to_empty_vec() {
        let mut sink = InMemoryByteSink::new();
        serialize_data_and_size_8_be(&mut sink, &[]).unwrap();
        let bytes = sink.finalize();
        assert_eq!(bytes.len(), 8);

        let mut source = InMemoryByteSource::new(&bytes);
        let decoded = deserialize_data_and_size_8_be(&mut source).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn blob_round_trips() {
        let mut sink = InMemoryByteSink::new();
        serialize_data_and_size_8_be(&mut sink, b"hello world").unwrap();
        let bytes = sink.finalize();

        let mut source = InMemoryByteSource::new(&bytes);
        let decoded = deserialize_data_and_size_8_be(&mut source).unwrap();
        assert_eq!(decoded, b"hello world");
    }

    #[test]
    fn truncated_length_prefix_is_an_error_distinct_from_malformed() {
        let short = [0u8, 0, 0, 0];
        let mut source = InMemoryByteSource::new(&short);
        let err = deserialize_8_be(&mut source).unwrap_err();
        assert!(err.is_serialization_error());
        assert!(matches!(err, BError::Truncated { .. }));
    }

    #[test]
    fn truncated_blob_body_is_truncated_not_malformed() {
        let mut sink = InMemoryByteSink::new();
        serialize_8_be(&mut sink, 100).unwrap();
        serialize_bytes(&mut sink, b"short").unwrap();
        let bytes = sink.finalize();

        let mut source = InMemoryByteSource::new(&bytes);
        let err = deserialize_data_and_size_8_be(&mut source).unwrap_err();
        assert!(matches!(err, BError::Truncated { .. }));
    }
}
