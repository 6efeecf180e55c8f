//! # Type UUIDs
//!
//! Each Question and Answer type carries a fixed 16-byte identifier used as
//! a serialization discriminator and as half of a cache key. The reference
//! encoding places the first 4 bytes in standard UUID byte order, followed
//! by 2+2+2 bytes, followed by a 6-byte node — i.e. exactly the layout of a
//! standard UUID, so we wrap [`uuid::Uuid`] rather than reinvent it.

use crate::error::{BError, BResult};

/// A stable 16-byte type identifier.
///
/// `TypeUuid`s are compile-time constants in practice (one per concrete
/// `Question`/`Answer` type), but are represented as a runtime value so they
/// can be stored alongside serialized question bytes as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeUuid(uuid::Uuid);

impl TypeUuid {
    /// Construct from a 16-byte big-endian array, as read from the wire or
    /// the database.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }

    /// Construct from a `uuid::Uuid` (e.g. a `uuid::uuid!` literal).
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The 16-byte big-endian encoding used on the wire and as a database
    /// cache-key prefix.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; 16] {
        *self.0.as_bytes()
    }

    /// Read a `TypeUuid` from exactly 16 bytes at the front of `data`.
    pub fn read_from(data: &[u8]) -> BResult<(Self, &[u8])> {
        if data.len() < 16 {
            return Err(BError::Truncated {
                expected: 16,
                actual: data.len(),
            });
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&data[..16]);
        Ok((Self::from_bytes(bytes), &data[16..]))
    }
}

impl std::fmt::Display for TypeUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
