//! Postgres-backed scoreboard store.
//!
//! One row per scoreboard, the document itself in a JSONB column. A mutation
//! locks the row (`SELECT … FOR UPDATE`), runs the aggregate in process and
//! writes the document back inside the same transaction.
//!
//! ## Error Mapping
//!
//! | SQLx error | StoreError |
//! |------------|------------|
//! | Database / PoolClosed / Io / other | `Backend` |
//! | Row decodes but JSON does not match the document shape | `Corrupt` |

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument};

use cricket_core::{Aggregate, AggregateRoot, DomainError};
use cricket_scoring::{Scoreboard, ScoreboardCommand, ScoreboardId};

use super::r#trait::{FirstOrCreated, ScoreboardStore, StoreError};

/// Postgres-backed scoreboard store.
#[derive(Debug, Clone)]
pub struct PostgresScoreboardStore {
    pool: Arc<PgPool>,
}

impl PostgresScoreboardStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `scoreboards` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scoreboards (
                id          UUID PRIMARY KEY,
                document    JSONB NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_scoreboards_table", e))?;
        Ok(())
    }

    async fn insert_empty(
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Scoreboard, StoreError> {
        let fresh = Scoreboard::empty(ScoreboardId::generate());
        sqlx::query("INSERT INTO scoreboards (id, document) VALUES ($1, $2)")
            .bind(*fresh.id_typed().0.as_uuid())
            .bind(to_document(&fresh)?)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert_scoreboard", e))?;
        Ok(fresh)
    }
}

fn to_document(scoreboard: &Scoreboard) -> Result<JsonValue, StoreError> {
    serde_json::to_value(scoreboard)
        .map_err(|e| StoreError::Corrupt(format!("document serialization failed: {e}")))
}

fn from_row(row: &sqlx::postgres::PgRow) -> Result<Scoreboard, StoreError> {
    let document: JsonValue = row
        .try_get("document")
        .map_err(|e| map_sqlx_error("read_document", e))?;
    serde_json::from_value(document)
        .map_err(|e| StoreError::Corrupt(format!("failed to deserialize scoreboard: {e}")))
}

#[async_trait::async_trait]
impl ScoreboardStore for PostgresScoreboardStore {
    #[instrument(skip(self), fields(created = tracing::field::Empty), err)]
    async fn first_or_create(&self) -> Result<FirstOrCreated, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query("SELECT document FROM scoreboards ORDER BY created_at ASC, id ASC LIMIT 1")
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("select_first", e))?;

        let result = match row {
            Some(row) => FirstOrCreated {
                scoreboard: from_row(&row)?,
                created: false,
            },
            None => FirstOrCreated {
                scoreboard: Self::insert_empty(&mut tx).await?,
                created: true,
            },
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("created", result.created);
        Ok(result)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Scoreboard>, StoreError> {
        let rows = sqlx::query("SELECT document FROM scoreboards ORDER BY created_at ASC, id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_scoreboards", e))?;

        rows.iter().map(from_row).collect()
    }

    #[instrument(skip(self), fields(scoreboard_id = %id), err)]
    async fn get(&self, id: ScoreboardId) -> Result<Option<Scoreboard>, StoreError> {
        let row = sqlx::query("SELECT document FROM scoreboards WHERE id = $1")
            .bind(*id.0.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_scoreboard", e))?;

        row.as_ref().map(from_row).transpose()
    }

    #[instrument(skip(self, command), fields(scoreboard_id = %id, version = tracing::field::Empty), err)]
    async fn execute(
        &self,
        id: ScoreboardId,
        command: &ScoreboardCommand,
    ) -> Result<Scoreboard, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query("SELECT document FROM scoreboards WHERE id = $1 FOR UPDATE")
            .bind(*id.0.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_scoreboard", e))?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::aggregate_not_found(id).into());
        };

        let mut scoreboard = from_row(&row)?;
        if let Err(err) = scoreboard.execute(command) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(err.into());
        }

        sqlx::query("UPDATE scoreboards SET document = $2, updated_at = NOW() WHERE id = $1")
            .bind(*id.0.as_uuid())
            .bind(to_document(&scoreboard)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_scoreboard", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("version", scoreboard.version());
        Ok(scoreboard)
    }

    #[instrument(skip(self), fields(scoreboard_id = %id), err)]
    async fn reset(&self, id: ScoreboardId) -> Result<Scoreboard, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let deleted = sqlx::query("DELETE FROM scoreboards WHERE id = $1")
            .bind(*id.0.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_scoreboard", e))?
            .rows_affected();

        if deleted == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::aggregate_not_found(id).into());
        }

        let fresh = Self::insert_empty(&mut tx).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(fresh)
    }
}

/// Map a SQLx error to a `StoreError`, keeping the failing operation name.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {}: {} (code {})",
            operation,
            db_err.message(),
            db_err.code().as_deref().unwrap_or("none")
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        other @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_)) => {
            StoreError::Corrupt(format!("decode error in {}: {}", operation, other))
        }
        other => StoreError::Backend(format!("error in {}: {}", operation, other)),
    }
}

