use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cricket_infra::MutationError;

pub fn mutation_error_to_response(err: MutationError) -> axum::response::Response {
    match err {
        MutationError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "Invalid request", msg),
        MutationError::UnknownEventType(tag) => {
            json_error(StatusCode::BAD_REQUEST, "Unknown event type", tag)
        }
        MutationError::AggregateNotFound(id) => {
            json_error(StatusCode::NOT_FOUND, "Scoreboard not found", id)
        }
        MutationError::PlayerNotFound(name) => {
            json_error(StatusCode::NOT_FOUND, "Player not found", name)
        }
        MutationError::Store(msg) => {
            tracing::error!(error = %msg, "store failure while serving request");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", msg)
        }
    }
}

/// `{ code, message, error }`, the shape the scorer UI already reads.
pub fn json_error(
    status: StatusCode,
    message: &'static str,
    error: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "code": status.as_u16(),
            "message": message,
            "error": error.into(),
        })),
    )
        .into_response()
}
