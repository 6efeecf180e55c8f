//! Question/Answer value protocol, type UUIDs, serialization helpers and
//! the error type shared across the rest of this workspace.
//!
//! This crate has no knowledge of futures, contexts, run loops or the
//! dispatcher — it defines only the vocabulary those crates build on.

pub mod answer;
pub mod error;
pub mod question;
pub mod serialize;
pub mod uuid;

pub use answer::{answer_vtable, AnswerValue, AnswerVTable, TypedAnswer};
pub use error::{BError, BResult};
pub use question::{question_vtable, QuestionValue, QuestionVTable, TypedQuestion};
pub use serialize::{
    deserialize_1, deserialize_2_be, deserialize_4_be, deserialize_8_be,
    deserialize_data_and_size_8_be, serialize_1, serialize_2_be, serialize_4_be, serialize_8_be,
    serialize_bytes, serialize_data_and_size_8_be, serialize_to_vec, ByteSink, ByteSource,
    InMemoryByteSink, InMemoryByteSource,
};
pub use uuid::TypeUuid;

/// Installs a `tracing-subscriber` `fmt` subscriber reading filter
/// directives from `RUST_LOG` (default `info`), matching the logging setup
/// shared by every binary in this workspace. Safe to call more than once;
/// only the first call takes effect.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
