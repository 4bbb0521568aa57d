//! Realtime channel over WebSocket.
//!
//! Frames are JSON `{ "event": …, "data": … }` in both directions. Each
//! connection gets a [`ConnectionId`] and a subscription to the broadcast bus,
//! and forwards only the messages whose audience includes it.
//!
//! The operator's "current action" (`save_event_to_database`) is transient
//! relay state: it is forwarded to the other viewers and never stored.

use axum::{
    extract::{
        Extension,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};

use cricket_core::ConnectionId;
use cricket_infra::{MutationError, MutationOutcome};
use cricket_scoring::ScoreboardId;

use crate::app::broadcast::{Operation, topics};
use crate::app::dto::{AddPlayerRequest, ClientMessage, NewBallRequest, SwapPlayersRequest};
use crate::app::services::{AppServices, Engine};

/// GET /ws
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Extension(services): Extension<AppServices>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, services))
}

async fn handle_socket(mut socket: WebSocket, services: AppServices) {
    let connection = ConnectionId::new();
    let mut subscription = services.coordinator.subscribe();
    tracing::info!(connection_id = %connection, "viewer connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(_) => {
                            services.coordinator.error(
                                connection,
                                Operation::Message,
                                "ValidationError",
                                "binary frames must be UTF-8 JSON",
                            );
                            continue;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        tracing::debug!(connection_id = %connection, error = %err, "socket read failed");
                        break;
                    }
                };
                handle_client_message(&services, connection, &text).await;
            }
            outgoing = subscription.recv() => {
                let Ok(message) = outgoing else { break };
                if !message.audience.includes(connection) {
                    continue;
                }
                let frame = message.to_frame().to_string();
                if socket.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        }
    }

    tracing::info!(connection_id = %connection, "viewer disconnected");
}

/// Act on one client frame. Every outcome, including a malformed frame, is
/// published through the coordinator; nothing here fails the connection.
pub async fn handle_client_message(services: &AppServices, connection: ConnectionId, text: &str) {
    let coordinator = &services.coordinator;
    let engine = &*services.engine;

    let message = match ClientMessage::parse(text) {
        Ok(message) => message,
        Err(err) => {
            tracing::warn!(connection_id = %connection, error = %err, "rejected client frame");
            coordinator.error(connection, err.operation(), err.kind(), &err.to_string());
            return;
        }
    };

    match message {
        ClientMessage::NewBall(req) => {
            coordinator.report(connection, Operation::NewBall, new_ball(engine, req).await);
        }
        ClientMessage::AddNewPlayer(req) => {
            let result = add_new_player(engine, req).await;
            coordinator.report(connection, Operation::AddNewPlayer, result);
        }
        ClientMessage::SwapPlayers(req) => {
            let result = swap_players(engine, req).await;
            coordinator.report(connection, Operation::SwapPlayers, result);
        }
        ClientMessage::ClearScoreboard(raw_id) => {
            let result = match scoreboard_id(&raw_id) {
                Ok(id) => engine.clear_scoreboard(id).await,
                Err(err) => Err(err),
            };
            coordinator.report(connection, Operation::ClearScoreboard, result);
        }
        ClientMessage::ClearNonStrikerInput => {
            coordinator.relay(connection, topics::NONSTRIKER_INPUT_CLEANED, serde_json::Value::Null);
        }
        ClientMessage::ClearStrikerInput => {
            coordinator.relay(connection, topics::STRIKER_INPUT_CLEANED, serde_json::Value::Null);
        }
        ClientMessage::SaveCurrentAction(action) => {
            coordinator.relay(connection, topics::SET_CURRENT_ACTION, action);
        }
    }
}

fn scoreboard_id(raw: &str) -> Result<ScoreboardId, MutationError> {
    raw.trim().parse().map_err(MutationError::from)
}

async fn new_ball(engine: &Engine, req: NewBallRequest) -> Result<MutationOutcome, MutationError> {
    let id = scoreboard_id(&req.scoreboard_id)?;
    engine.apply_event(id, &req.ball_type, req.payload).await
}

async fn add_new_player(
    engine: &Engine,
    req: AddPlayerRequest,
) -> Result<MutationOutcome, MutationError> {
    let id = scoreboard_id(&req.scoreboard_id)?;

    let mut players = req.new_player.into_iter();
    let (name, record) = match (players.next(), players.next()) {
        (Some(player), None) => player,
        _ => {
            return Err(MutationError::Validation(
                "newPlayer must contain exactly one player".to_string(),
            ));
        }
    };

    engine.add_player(id, name, record).await
}

async fn swap_players(
    engine: &Engine,
    req: SwapPlayersRequest,
) -> Result<MutationOutcome, MutationError> {
    let id = scoreboard_id(&req.scoreboard_id)?;
    engine.swap_strikers(id, req.striker, req.non_striker).await
}
