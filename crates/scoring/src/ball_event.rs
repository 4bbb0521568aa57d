use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cricket_events::Event;

use crate::catalog::BallKind;
use crate::payload::BallPayload;
use crate::scoreboard::ScoreboardId;

/// One delivery as the scorer submitted it.
///
/// Kept verbatim in the audit trail; the scoreboard only ever sees the
/// derived increments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallEvent {
    pub scoreboard_id: ScoreboardId,
    /// Flat tag as received, when the scorer used one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub kind: BallKind,
    pub payload: BallPayload,
    pub occurred_at: DateTime<Utc>,
}

impl BallEvent {
    pub fn new(scoreboard_id: ScoreboardId, kind: BallKind, payload: BallPayload) -> Self {
        Self {
            scoreboard_id,
            tag: kind.tag().map(str::to_string),
            kind,
            payload,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl Event for BallEvent {
    fn event_type(&self) -> &'static str {
        "cricket.ball.delivered"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
