use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cricket_core::AggregateId;

use crate::event::Event;

/// Envelope for an audited event, carrying scoreboard + stream metadata.
///
/// This is the unit appended to the ball log. The log is an audit trail only:
/// scoreboard totals are never rebuilt from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    scoreboard_id: AggregateId,

    /// Position in the scoreboard's log, starting at 1. Assigned by the log on append.
    sequence_number: u64,

    event_type: String,
    event_version: u32,
    occurred_at: DateTime<Utc>,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        scoreboard_id: AggregateId,
        sequence_number: u64,
        event_type: impl Into<String>,
        event_version: u32,
        occurred_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            scoreboard_id,
            sequence_number,
            event_type: event_type.into(),
            event_version,
            occurred_at,
            payload,
        }
    }

    /// Wrap a typed event; the sequence number stays 0 until the log assigns one.
    pub fn from_typed(scoreboard_id: AggregateId, event: E) -> Self
    where
        E: Event,
    {
        Self::new(
            Uuid::now_v7(),
            scoreboard_id,
            0,
            event.event_type(),
            event.version(),
            event.occurred_at(),
            event,
        )
    }

    pub fn with_sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn scoreboard_id(&self) -> AggregateId {
        self.scoreboard_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
