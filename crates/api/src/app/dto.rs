//! Wire DTOs: realtime client frames and HTTP response bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use cricket_scoring::{BallPayload, BallType, PlayerRecord, Scoreboard};

use crate::app::broadcast::Operation;

/// Raw `{ "event": …, "data": … }` frame, before the event name is checked.
#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBallRequest {
    #[serde(rename = "scoreboardId", alias = "scoreboard_id")]
    pub scoreboard_id: String,
    #[serde(rename = "type")]
    pub ball_type: BallType,
    #[serde(default)]
    pub payload: BallPayload,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddPlayerRequest {
    #[serde(rename = "scoreboardId", alias = "scoreboard_id")]
    pub scoreboard_id: String,
    #[serde(rename = "newPlayer", alias = "new_player")]
    pub new_player: BTreeMap<String, PlayerRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwapPlayersRequest {
    #[serde(rename = "scoreboardId", alias = "scoreboard_id")]
    pub scoreboard_id: String,
    pub striker: String,
    #[serde(rename = "nonStriker", alias = "non_striker")]
    pub non_striker: String,
}

/// `clear_scoreboard` accepts a bare id or `{ "scoreboardId": … }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum ClearTarget {
    Id(String),
    Object {
        #[serde(rename = "scoreboardId", alias = "scoreboard_id", alias = "_id")]
        scoreboard_id: String,
    },
}

impl From<ClearTarget> for String {
    fn from(value: ClearTarget) -> Self {
        match value {
            ClearTarget::Id(id) | ClearTarget::Object { scoreboard_id: id } => id,
        }
    }
}

/// A decoded client → server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    NewBall(NewBallRequest),
    AddNewPlayer(AddPlayerRequest),
    SwapPlayers(SwapPlayersRequest),
    ClearScoreboard(String),
    ClearNonStrikerInput,
    ClearStrikerInput,
    /// The operator's in-progress ball selection; relayed, never stored.
    SaveCurrentAction(JsonValue),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("frame is not a JSON object with an event name: {0}")]
    Frame(String),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("invalid data for '{event}': {reason}")]
    Data { event: String, reason: String },
}

impl MessageError {
    /// The operation whose failure message the sender should see.
    pub fn operation(&self) -> Operation {
        match self {
            MessageError::Data { event, .. } => match event.as_str() {
                "new-ball" => Operation::NewBall,
                "add-new-player" => Operation::AddNewPlayer,
                "set_swap_players" => Operation::SwapPlayers,
                "clear_scoreboard" | "clear-scoreboard" => Operation::ClearScoreboard,
                _ => Operation::Message,
            },
            _ => Operation::Message,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MessageError::UnknownEvent(_) => "UnknownEvent",
            _ => "ValidationError",
        }
    }
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let frame: Frame =
            serde_json::from_str(text).map_err(|e| MessageError::Frame(e.to_string()))?;

        let event = frame.event;
        let data = frame.data;
        let invalid = |e: serde_json::Error| MessageError::Data {
            event: event.clone(),
            reason: e.to_string(),
        };

        match event.as_str() {
            "new-ball" => serde_json::from_value(data)
                .map(ClientMessage::NewBall)
                .map_err(invalid),
            "add-new-player" => serde_json::from_value(data)
                .map(ClientMessage::AddNewPlayer)
                .map_err(invalid),
            "set_swap_players" => serde_json::from_value(data)
                .map(ClientMessage::SwapPlayers)
                .map_err(invalid),
            "clear_scoreboard" | "clear-scoreboard" => serde_json::from_value::<ClearTarget>(data)
                .map(|target| ClientMessage::ClearScoreboard(target.into()))
                .map_err(invalid),
            "clear_non_striker_input" => Ok(ClientMessage::ClearNonStrikerInput),
            "clear_striker_input" => Ok(ClientMessage::ClearStrikerInput),
            "save_event_to_database" => Ok(ClientMessage::SaveCurrentAction(data)),
            _ => Err(MessageError::UnknownEvent(event.clone())),
        }
    }
}

/// Body of `GET /api/scoreboard`.
#[derive(Debug, Serialize)]
pub struct ScoreboardResponse {
    pub code: u16,
    pub error: &'static str,
    pub message: &'static str,
    pub data: Scoreboard,
}

impl ScoreboardResponse {
    pub fn found(scoreboard: Scoreboard) -> Self {
        Self {
            code: 200,
            error: "",
            message: "Scoreboard found",
            data: scoreboard,
        }
    }

    pub fn created(scoreboard: Scoreboard) -> Self {
        Self {
            code: 200,
            error: "",
            message: "New scoreboard created",
            data: scoreboard,
        }
    }
}
