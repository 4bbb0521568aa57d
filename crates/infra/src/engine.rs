//! Score mutation pipeline.
//!
//! ```text
//! request
//!   ↓
//! 1. Validate payload, resolve ball kind
//!   ↓
//! 2. Store executes the command (handle + apply as one atomic document update)
//!   ↓
//! 3. Append raw ball to the audit log (best-effort)
//!   ↓
//! 4. Read back the scoreboard list for broadcast
//! ```
//!
//! Steps 2 through 4 run under a single async gate, so the list returned with a
//! mutation is exactly the state that mutation produced; no other writer can
//! slip in between the write and the read-back.

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use cricket_core::{AggregateRoot, DomainError};
use cricket_events::EventEnvelope;
use cricket_scoring::{
    AddPlayer, BallEvent, BallPayload, BallType, PlayerRecord, RecordBall, Scoreboard,
    ScoreboardCommand, ScoreboardId, SwapStrikers,
};

use crate::ball_log::BallLog;
use crate::store::{FirstOrCreated, ScoreboardStore, StoreError};

/// Why a mutation was rejected or failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("scoreboard not found: {0}")]
    AggregateNotFound(String),

    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("store error: {0}")]
    Store(String),
}

impl MutationError {
    /// Short machine-readable name, used as the `error` field on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            MutationError::Validation(_) => "ValidationError",
            MutationError::UnknownEventType(_) => "UnknownEventType",
            MutationError::AggregateNotFound(_) => "AggregateNotFound",
            MutationError::PlayerNotFound(_) => "PlayerNotFound",
            MutationError::Store(_) => "StoreError",
        }
    }
}

impl From<DomainError> for MutationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => MutationError::Validation(msg),
            DomainError::InvalidId(msg) => MutationError::Validation(msg),
            DomainError::UnknownEventType(tag) => MutationError::UnknownEventType(tag),
            DomainError::AggregateNotFound(id) => MutationError::AggregateNotFound(id),
            DomainError::PlayerNotFound(name) => MutationError::PlayerNotFound(name),
        }
    }
}

impl From<StoreError> for MutationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(err) => err.into(),
            other => MutationError::Store(other.to_string()),
        }
    }
}

/// A committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// The scoreboard the mutation produced (or the fresh one, after a clear).
    pub scoreboard: Scoreboard,
    /// Every scoreboard in the store, read back right after the mutation.
    pub scoreboards: Vec<Scoreboard>,
}

/// Applies ball events and player changes to stored scoreboards.
///
/// - `S`: scoreboard store (in-memory in tests, Postgres in production)
/// - `L`: ball audit log
#[derive(Debug)]
pub struct ScoreMutationEngine<S, L> {
    store: S,
    log: L,
    gate: Mutex<()>,
}

impl<S, L> ScoreMutationEngine<S, L> {
    pub fn new(store: S, log: L) -> Self {
        Self {
            store,
            log,
            gate: Mutex::new(()),
        }
    }
}

impl<S, L> ScoreMutationEngine<S, L>
where
    S: ScoreboardStore,
    L: BallLog,
{
    /// The current scoreboard, created zeroed on first use.
    pub async fn current(&self) -> Result<FirstOrCreated, MutationError> {
        let _guard = self.gate.lock().await;
        let current = self.store.first_or_create().await?;
        if current.created {
            info!(scoreboard_id = %current.scoreboard.id_typed(), "scoreboard created");
        }
        Ok(current)
    }

    pub async fn list(&self) -> Result<Vec<Scoreboard>, MutationError> {
        Ok(self.store.list().await?)
    }

    /// Score one delivery.
    pub async fn apply_event(
        &self,
        id: ScoreboardId,
        ball_type: &BallType,
        payload: BallPayload,
    ) -> Result<MutationOutcome, MutationError> {
        payload.validate()?;
        let kind = ball_type.resolve()?;

        let _guard = self.gate.lock().await;

        let command = ScoreboardCommand::RecordBall(RecordBall {
            scoreboard_id: id,
            kind,
            payload: payload.clone(),
            occurred_at: Utc::now(),
        });
        let scoreboard = self.store.execute(id, &command).await?;
        info!(scoreboard_id = %id, ball = %kind, version = scoreboard.version(), "ball recorded");

        let mut event = BallEvent::new(id, kind, payload);
        if let BallType::Tag(tag) = ball_type {
            event = event.with_tag(tag.clone());
        }
        if let Err(err) = self.log.append(EventEnvelope::from_typed(id.0, event)).await {
            warn!(scoreboard_id = %id, error = %err, "failed to append ball to audit log");
        }

        self.outcome(scoreboard).await
    }

    /// Insert or overwrite a player record.
    pub async fn add_player(
        &self,
        id: ScoreboardId,
        name: impl Into<String>,
        record: PlayerRecord,
    ) -> Result<MutationOutcome, MutationError> {
        let name = name.into();
        let _guard = self.gate.lock().await;

        let command = ScoreboardCommand::AddPlayer(AddPlayer {
            scoreboard_id: id,
            name: name.clone(),
            record,
            occurred_at: Utc::now(),
        });
        let scoreboard = self.store.execute(id, &command).await?;
        info!(scoreboard_id = %id, player = %name, "player added");

        self.outcome(scoreboard).await
    }

    /// Exchange the roles of two players.
    pub async fn swap_strikers(
        &self,
        id: ScoreboardId,
        striker: impl Into<String>,
        non_striker: impl Into<String>,
    ) -> Result<MutationOutcome, MutationError> {
        let (striker, non_striker) = (striker.into(), non_striker.into());
        let _guard = self.gate.lock().await;

        let command = ScoreboardCommand::SwapStrikers(SwapStrikers {
            scoreboard_id: id,
            striker: striker.clone(),
            non_striker: non_striker.clone(),
            occurred_at: Utc::now(),
        });
        let scoreboard = self.store.execute(id, &command).await?;
        info!(scoreboard_id = %id, %striker, %non_striker, "strikers swapped");

        self.outcome(scoreboard).await
    }

    /// Replace scoreboard `id` with a fresh, zeroed one.
    pub async fn clear_scoreboard(&self, id: ScoreboardId) -> Result<MutationOutcome, MutationError> {
        let _guard = self.gate.lock().await;

        let fresh = self.store.reset(id).await?;
        info!(old_id = %id, new_id = %fresh.id_typed(), "scoreboard cleared");

        self.outcome(fresh).await
    }

    /// Audit trail for one scoreboard.
    pub async fn ball_log(
        &self,
        id: ScoreboardId,
    ) -> Result<Vec<EventEnvelope<BallEvent>>, MutationError> {
        if self.store.get(id).await?.is_none() {
            return Err(DomainError::aggregate_not_found(id).into());
        }
        Ok(self.log.list(id).await?)
    }

    async fn outcome(&self, scoreboard: Scoreboard) -> Result<MutationOutcome, MutationError> {
        let scoreboards = self.store.list().await?;
        Ok(MutationOutcome {
            scoreboard,
            scoreboards,
        })
    }
}
