//! Broadcast coordinator: turns mutation results into realtime messages.
//!
//! Every connected viewer subscribes to one lossy broadcast bus. Messages are
//! addressed with an [`Audience`] and each connection drops the ones not meant
//! for it.

use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use cricket_core::ConnectionId;
use cricket_events::{BroadcastBus, EventBus, Subscription};
use cricket_infra::{MutationError, MutationOutcome};
use cricket_scoring::Scoreboard;

use crate::config::ErrorScope;

/// Server → client event names.
pub mod topics {
    pub const UPDATED_SCOREBOARD: &str = "updatedScoreboard";
    pub const ERROR: &str = "error";
    pub const NONSTRIKER_INPUT_CLEANED: &str = "nonstriker_input_cleaned";
    pub const STRIKER_INPUT_CLEANED: &str = "striker_input_cleaned";
    pub const SET_CURRENT_ACTION: &str = "set_current_action";
}

/// Operations that can fail, with the operator-facing message for each.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    NewBall,
    AddNewPlayer,
    SwapPlayers,
    ClearScoreboard,
    Message,
}

impl Operation {
    /// Wire name of the client event that triggered the operation.
    pub fn event_name(self) -> &'static str {
        match self {
            Operation::NewBall => "new-ball",
            Operation::AddNewPlayer => "add-new-player",
            Operation::SwapPlayers => "set_swap_players",
            Operation::ClearScoreboard => "clear_scoreboard",
            Operation::Message => "message",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::NewBall => "New Ball Error!",
            Operation::AddNewPlayer => "Add New Player Failed",
            Operation::SwapPlayers => "Swap Striker Non Striker Error!",
            Operation::ClearScoreboard => "Clear Scoreboard Error!",
            Operation::Message => "Malformed message",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Except(ConnectionId),
    Only(ConnectionId),
}

impl Audience {
    pub fn includes(&self, connection: ConnectionId) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Except(excluded) => *excluded != connection,
            Audience::Only(target) => *target == connection,
        }
    }
}

/// One realtime message, as carried on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeMessage {
    pub audience: Audience,
    pub topic: &'static str,
    pub payload: JsonValue,
}

impl RealtimeMessage {
    /// `{ "event": …, "data": … }` frame as sent to clients.
    pub fn to_frame(&self) -> JsonValue {
        json!({ "event": self.topic, "data": self.payload })
    }
}

#[derive(Debug, Clone)]
pub struct BroadcastCoordinator {
    bus: BroadcastBus<RealtimeMessage>,
    error_scope: ErrorScope,
}

impl BroadcastCoordinator {
    pub fn new(capacity: usize, error_scope: ErrorScope) -> Self {
        Self {
            bus: BroadcastBus::new(capacity),
            error_scope,
        }
    }

    pub fn subscribe(&self) -> Subscription<RealtimeMessage> {
        self.bus.subscribe()
    }

    /// Publish the outcome of a mutation requested by `origin`.
    pub fn report(
        &self,
        origin: ConnectionId,
        operation: Operation,
        result: Result<MutationOutcome, MutationError>,
    ) {
        match result {
            Ok(outcome) => self.scoreboard_updated(&outcome.scoreboards),
            Err(err) => {
                tracing::warn!(
                    connection_id = %origin,
                    operation = operation.event_name(),
                    error = %err,
                    "mutation failed"
                );
                self.error(origin, operation, err.kind(), &err.to_string());
            }
        }
    }

    /// Full state to everyone, the sender included.
    pub fn scoreboard_updated(&self, scoreboards: &[Scoreboard]) {
        match serde_json::to_value(scoreboards) {
            Ok(payload) => {
                self.publish(Audience::Everyone, topics::UPDATED_SCOREBOARD, payload);
            }
            Err(err) => tracing::error!(error = %err, "failed to serialize scoreboards"),
        }
    }

    /// Error signal, scoped according to the configured [`ErrorScope`].
    pub fn error(&self, origin: ConnectionId, operation: Operation, kind: &str, detail: &str) {
        let audience = match self.error_scope {
            ErrorScope::Originator => Audience::Only(origin),
            ErrorScope::Everyone => Audience::Everyone,
        };
        let payload = json!({
            "message": operation.failure_message(),
            "error": detail,
            "kind": kind,
            "operation": operation.event_name(),
        });
        self.publish(audience, topics::ERROR, payload);
    }

    /// Transient UI signal for every viewer except the sender. Never persisted.
    pub fn relay(&self, origin: ConnectionId, topic: &'static str, payload: JsonValue) {
        self.publish(Audience::Except(origin), topic, payload);
    }

    fn publish(&self, audience: Audience, topic: &'static str, payload: JsonValue) {
        let receivers = self.bus.publish(RealtimeMessage {
            audience,
            topic,
            payload,
        });
        tracing::debug!(topic, receivers, "realtime message published");
    }
}
