//! Read-only viewer stream over Server-Sent Events.
//!
//! Carries every message addressed to [`Audience::Everyone`]: scoreboard
//! updates, and errors when the error scope is `everyone`. Connection-scoped
//! messages and relays never reach SSE viewers.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::Extension,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::app::broadcast::{Audience, RealtimeMessage};
use crate::app::services::AppServices;

/// GET /api/scoreboard/stream
pub async fn scoreboard_stream(
    Extension(services): Extension<AppServices>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = services.coordinator.subscribe().into_inner();
    tracing::info!("sse viewer connected");

    let stream = BroadcastStream::new(receiver).filter_map(|item| match item {
        Ok(message) if message.audience == Audience::Everyone => to_sse_event(&message).map(Ok),
        Ok(_) => None,
        Err(lagged) => {
            tracing::warn!(error = %lagged, "sse viewer lagged; dropping missed messages");
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

fn to_sse_event(message: &RealtimeMessage) -> Option<SseEvent> {
    match serde_json::to_string(&message.payload) {
        Ok(data) => Some(SseEvent::default().event(message.topic).data(data)),
        Err(err) => {
            tracing::error!(error = %err, topic = message.topic, "failed to encode sse event");
            None
        }
    }
}
