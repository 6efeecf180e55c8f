//! The `Database` trait consumed by the dispatcher, plus two
//! implementations: an in-memory store for tests and single-shot runs, and
//! a Postgres-backed store keyed by `(vtable_uuid, serialized_question)`.

pub mod error;
pub mod fingerprint;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::{DbError, DbResult};
pub use fingerprint::Fingerprint;
pub use memory::InMemoryDatabase;
pub use postgres::PostgresDatabase;
pub use traits::Database;
