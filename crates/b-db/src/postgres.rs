//! A Postgres-backed [`Database`], keyed by `(vtable_uuid,
//! serialized_question)` exactly as the core's external interface
//! specifies. Uses runtime-checked `sqlx` queries rather than the `query!`
//! macro family, since the macros require a live database at compile time.

use sqlx::{PgPool, Row};
use tracing::debug;

use b_shared::{AnswerValue, AnswerVTable, TypeUuid};

use crate::error::{DbError, DbResult};
use crate::fingerprint::Fingerprint;
use crate::traits::Database;

/// Connects to Postgres and ensures `b_answers`/`b_dependencies` exist,
/// mirroring the rest of this workspace's pattern of running idempotent
/// `CREATE TABLE IF NOT EXISTS` statements at startup rather than shipping a
/// separate migration runner for a two-table schema.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn connect(database_url: &str) -> DbResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn new_with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn migrate(&self) -> DbResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS b_answers (
                type_uuid UUID NOT NULL,
                question_bytes BYTEA NOT NULL,
                answer_bytes BYTEA NOT NULL,
                PRIMARY KEY (type_uuid, question_bytes)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS b_dependencies (
                from_type_uuid UUID NOT NULL,
                from_question_bytes BYTEA NOT NULL,
                to_type_uuid UUID NOT NULL,
                to_question_bytes BYTEA NOT NULL,
                PRIMARY KEY (from_type_uuid, from_question_bytes, to_type_uuid, to_question_bytes)
            )",
        )
        .execute(&self.pool)
        .await?;

        debug!("b-db schema present");
        Ok(())
    }
}

fn uuid_of(type_uuid: TypeUuid) -> uuid::Uuid {
    uuid::Uuid::from_bytes(type_uuid.as_bytes())
}

#[async_trait::async_trait]
impl Database for PostgresDatabase {
    async fn record_dependency(&self, from: &Fingerprint, to: &Fingerprint) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO b_dependencies
                (from_type_uuid, from_question_bytes, to_type_uuid, to_question_bytes)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT DO NOTHING",
        )
        .bind(uuid_of(from.type_uuid))
        .bind(&from.question_bytes)
        .bind(uuid_of(to.type_uuid))
        .bind(&to.question_bytes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_answer(&self, key: &Fingerprint, answer: &dyn AnswerValue) -> DbResult<()> {
        let bytes = b_shared::serialize_to_vec(|sink| answer.serialize(sink))?;
        sqlx::query(
            "INSERT INTO b_answers (type_uuid, question_bytes, answer_bytes)
             VALUES ($1, $2, $3)
             ON CONFLICT (type_uuid, question_bytes)
             DO UPDATE SET answer_bytes = EXCLUDED.answer_bytes",
        )
        .bind(uuid_of(key.type_uuid))
        .bind(&key.question_bytes)
        .bind(bytes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn look_up_answer(
        &self,
        key: &Fingerprint,
        answer_vtable: AnswerVTable,
    ) -> DbResult<Option<Box<dyn AnswerValue>>> {
        let row = sqlx::query("SELECT answer_bytes FROM b_answers WHERE type_uuid = $1 AND question_bytes = $2")
            .bind(uuid_of(key.type_uuid))
            .bind(&key.question_bytes)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let bytes: Vec<u8> = row
                    .try_get("answer_bytes")
                    .map_err(|e| DbError::backend(e.to_string()))?;
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

    /// These tests require a live Postgres reachable via `DATABASE_URL` and
    /// are skipped otherwise, matching the rest of this workspace's
    /// integration test convention for `sqlx`-backed stores.
    async fn connect_from_env() -> Option<PostgresDatabase> {
        let url = std::env::var("DATABASE_URL").ok()?;
        PostgresDatabase::connect(&url).await.ok()
    }

    #[tokio::test]
    async fn records_and_looks_up_an_answer_against_live_postgres() {
        let Some(db) = connect_from_env().await else {
            eprintln!("skipping: DATABASE_URL not set");
            return;
        };

        use b_shared::{answer_vtable, ByteSink, ByteSource, TypedAnswer};

        #[derive(Debug, Clone, PartialEq)]
        struct DemoAnswer(u64);
        impl TypedAnswer for DemoAnswer {
            fn type_uuid() -> TypeUuid {
                TypeUuid::from_uuid(uuid::uuid!("aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa"))
            }
            fn serialize(&self, sink: &mut dyn ByteSink) -> b_shared::BResult<()> {
                b_shared::serialize_8_be(sink, self.0)
            }
            fn deserialize(source: &mut dyn ByteSource) -> b_shared::BResult<Self> {
                Ok(DemoAnswer(b_shared::deserialize_8_be(source)?))
            }
        }

        let key = Fingerprint {
            type_uuid: TypeUuid::from_uuid(uuid::uuid!("bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb")),
            question_bytes: b"postgres-smoke-test".to_vec(),
        };
        db.record_answer(&key, &DemoAnswer(7)).await.unwrap();
        let found = db
            .look_up_answer(&key, answer_vtable::<DemoAnswer>())
            .await
            .unwrap()
            .expect("answer should round-trip through Postgres");
        assert!(found.equal(&DemoAnswer(7)));
    }
}
