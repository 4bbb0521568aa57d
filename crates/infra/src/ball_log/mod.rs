//! Append-only audit trail of every ball submitted.
//!
//! The log is written after the scoreboard has been updated and is never read
//! back to compute totals. A failed append does not undo the scoreboard
//! update.

pub mod postgres;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use cricket_events::EventEnvelope;
use cricket_scoring::{BallEvent, ScoreboardId};

use crate::store::StoreError;

pub use postgres::PostgresBallLog;

/// Append-only, per-scoreboard ball log.
#[async_trait::async_trait]
pub trait BallLog: Send + Sync {
    /// Append one ball. The log assigns the next sequence number for the
    /// scoreboard (starting at 1) and returns the stored envelope.
    async fn append(
        &self,
        envelope: EventEnvelope<BallEvent>,
    ) -> Result<EventEnvelope<BallEvent>, StoreError>;

    /// Every ball logged against `scoreboard_id`, in sequence order.
    async fn list(
        &self,
        scoreboard_id: ScoreboardId,
    ) -> Result<Vec<EventEnvelope<BallEvent>>, StoreError>;
}

#[async_trait::async_trait]
impl<L> BallLog for Arc<L>
where
    L: BallLog + ?Sized,
{
    async fn append(
        &self,
        envelope: EventEnvelope<BallEvent>,
    ) -> Result<EventEnvelope<BallEvent>, StoreError> {
        (**self).append(envelope).await
    }

    async fn list(
        &self,
        scoreboard_id: ScoreboardId,
    ) -> Result<Vec<EventEnvelope<BallEvent>>, StoreError> {
        (**self).list(scoreboard_id).await
    }
}

/// In-memory ball log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBallLog {
    streams: RwLock<HashMap<ScoreboardId, Vec<EventEnvelope<BallEvent>>>>,
}

impl InMemoryBallLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BallLog for InMemoryBallLog {
    async fn append(
        &self,
        envelope: EventEnvelope<BallEvent>,
    ) -> Result<EventEnvelope<BallEvent>, StoreError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let stream = streams
            .entry(ScoreboardId(envelope.scoreboard_id()))
            .or_default();
        let next = stream.last().map(|e| e.sequence_number()).unwrap_or(0) + 1;
        let stored = envelope.with_sequence_number(next);
        stream.push(stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        scoreboard_id: ScoreboardId,
    ) -> Result<Vec<EventEnvelope<BallEvent>>, StoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(streams.get(&scoreboard_id).cloned().unwrap_or_default())
    }
}
