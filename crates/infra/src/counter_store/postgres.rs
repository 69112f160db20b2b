//! Postgres-backed counter store.
//!
//! ## Atomicity
//!
//! `modify` runs in one transaction that first takes
//! `pg_advisory_xact_lock` on the document type. The lock exists whether or
//! not the counter row does, so two first-ever allocations for the same type
//! serialize as well. It is released on commit or rollback.
//!
//! ## Error Mapping
//!
//! Every SQLx failure maps to `StoreError::Unavailable`; the allocator surfaces
//! it as `StorageUnavailable` and does not retry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use super::r#trait::{CounterMutation, CounterRecord, CounterStore, Modified, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS document_counters (
    document_type TEXT PRIMARY KEY,
    prefix        TEXT NULL,
    padding       INTEGER NULL,
    next_number   TEXT NOT NULL,
    updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Postgres-backed counter store.
#[derive(Debug, Clone)]
pub struct PostgresCounterStore {
    pool: Arc<PgPool>,
}

impl PostgresCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `document_counters` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for PostgresCounterStore {
    #[instrument(skip(self), err)]
    async fn load(&self, document_type: &str) -> Result<Option<CounterRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT document_type, prefix, padding, next_number, updated_at
            FROM document_counters
            WHERE document_type = $1
            "#,
        )
        .bind(document_type)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<CounterRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT document_type, prefix, padding, next_number, updated_at
            FROM document_counters
            ORDER BY document_type ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(record_from_row).collect()
    }

    #[instrument(skip(self, mutation), err)]
    async fn modify(
        &self,
        document_type: &str,
        mutation: CounterMutation<'_>,
    ) -> Result<Modified, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext('document_counters:' || $1))")
            .bind(document_type)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_counter", e))?;

        let previous = sqlx::query(
            r#"
            SELECT document_type, prefix, padding, next_number, updated_at
            FROM document_counters
            WHERE document_type = $1
            "#,
        )
        .bind(document_type)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("read_counter", e))?
        .as_ref()
        .map(record_from_row)
        .transpose()?;

        let current = match mutation(previous.as_ref()) {
            Ok(record) => record,
            Err(e) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(StoreError::Rejected(e));
            }
        };

        let padding = current.padding.map(|p| p as i32);
        sqlx::query(
            r#"
            INSERT INTO document_counters (document_type, prefix, padding, next_number, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (document_type)
            DO UPDATE SET
                prefix = EXCLUDED.prefix,
                padding = EXCLUDED.padding,
                next_number = EXCLUDED.next_number,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(document_type)
        .bind(&current.prefix)
        .bind(padding)
        .bind(&current.next_number)
        .bind(current.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("write_counter", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(Modified { previous, current })
    }
}

fn record_from_row(row: &PgRow) -> Result<CounterRecord, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Unavailable(format!("failed to decode counter row: {e}"));

    let padding: Option<i32> = row.try_get("padding").map_err(decode)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode)?;

    Ok(CounterRecord {
        document_type: row.try_get("document_type").map_err(decode)?,
        prefix: row.try_get("prefix").map_err(decode)?,
        // Out-of-range padding falls back to the default width.
        padding: padding.and_then(|p| u32::try_from(p).ok()).filter(|p| *p > 0),
        next_number: row.try_get("next_number").map_err(decode)?,
        updated_at,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Unavailable(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
