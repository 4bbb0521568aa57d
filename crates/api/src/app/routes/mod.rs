use axum::{Router, routing::get};

pub mod realtime;
pub mod scoreboard;
pub mod stream;
pub mod system;

/// Router for the scoreboard HTTP surface and the realtime channel.
pub fn router() -> Router {
    Router::new()
        .route("/ws", get(realtime::ws_upgrade))
        .merge(scoreboard::router())
}
