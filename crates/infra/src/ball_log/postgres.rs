//! Postgres-backed ball log.
//!
//! Rows are unique on `(scoreboard_id, sequence_number)`; a concurrent append
//! that loses the race fails with a unique violation instead of reusing a
//! sequence number.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use cricket_core::AggregateId;
use cricket_events::EventEnvelope;
use cricket_scoring::{BallEvent, ScoreboardId};

use super::BallLog;
use crate::store::StoreError;
use crate::store::postgres::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresBallLog {
    pool: Arc<PgPool>,
}

impl PostgresBallLog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `ball_events` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ball_events (
                event_id         UUID PRIMARY KEY,
                scoreboard_id    UUID NOT NULL,
                sequence_number  BIGINT NOT NULL CHECK (sequence_number > 0),
                event_type       TEXT NOT NULL,
                event_version    INTEGER NOT NULL,
                occurred_at      TIMESTAMPTZ NOT NULL,
                payload          JSONB NOT NULL,
                created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                UNIQUE (scoreboard_id, sequence_number)
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_ball_events_table", e))?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct BallEventRow {
    event_id: Uuid,
    scoreboard_id: Uuid,
    sequence_number: i64,
    event_type: String,
    event_version: i32,
    occurred_at: DateTime<Utc>,
    payload: JsonValue,
}

impl TryFrom<BallEventRow> for EventEnvelope<BallEvent> {
    type Error = StoreError;

    fn try_from(row: BallEventRow) -> Result<Self, Self::Error> {
        let payload: BallEvent = serde_json::from_value(row.payload)
            .map_err(|e| StoreError::Corrupt(format!("failed to deserialize ball event: {e}")))?;

        Ok(EventEnvelope::new(
            row.event_id,
            AggregateId::from_uuid(row.scoreboard_id),
            row.sequence_number as u64,
            row.event_type,
            row.event_version as u32,
            row.occurred_at,
            payload,
        ))
    }
}

#[async_trait::async_trait]
impl BallLog for PostgresBallLog {
    #[instrument(
        skip(self, envelope),
        fields(scoreboard_id = %envelope.scoreboard_id(), event_id = %envelope.event_id()),
        err
    )]
    async fn append(
        &self,
        envelope: EventEnvelope<BallEvent>,
    ) -> Result<EventEnvelope<BallEvent>, StoreError> {
        let payload = serde_json::to_value(envelope.payload())
            .map_err(|e| StoreError::Corrupt(format!("payload serialization failed: {e}")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_number), 0) FROM ball_events WHERE scoreboard_id = $1",
        )
        .bind(*envelope.scoreboard_id().as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("current_sequence", e))?;

        let stored = envelope.with_sequence_number(current as u64 + 1);

        sqlx::query(
            r#"
            INSERT INTO ball_events (
                event_id,
                scoreboard_id,
                sequence_number,
                event_type,
                event_version,
                occurred_at,
                payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(stored.event_id())
        .bind(*stored.scoreboard_id().as_uuid())
        .bind(stored.sequence_number() as i64)
        .bind(stored.event_type())
        .bind(stored.event_version() as i32)
        .bind(stored.occurred_at())
        .bind(payload)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_ball_event", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(stored)
    }

    #[instrument(skip(self), fields(scoreboard_id = %scoreboard_id), err)]
    async fn list(
        &self,
        scoreboard_id: ScoreboardId,
    ) -> Result<Vec<EventEnvelope<BallEvent>>, StoreError> {
        let rows = sqlx::query_as::<_, BallEventRow>(
            r#"
            SELECT
                event_id,
                scoreboard_id,
                sequence_number,
                event_type,
                event_version,
                occurred_at,
                payload
            FROM ball_events
            WHERE scoreboard_id = $1
            ORDER BY sequence_number ASC
            "#,
        )
        .bind(*scoreboard_id.0.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_ball_events", e))?;

        rows.into_iter().map(EventEnvelope::try_from).collect()
    }
}
