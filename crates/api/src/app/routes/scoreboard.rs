use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use cricket_scoring::ScoreboardId;

use crate::app::dto::ScoreboardResponse;
use crate::app::errors::{json_error, mutation_error_to_response};
use crate::app::routes::stream;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/scoreboard", get(current_scoreboard))
        .route("/api/scoreboard/stream", get(stream::scoreboard_stream))
        .route("/api/scoreboard/:id/balls", get(ball_log))
}

/// GET /api/scoreboard
///
/// Returns the first scoreboard in the store, creating a zeroed one when the
/// store is empty.
async fn current_scoreboard(
    Extension(services): Extension<AppServices>,
) -> axum::response::Response {
    match services.engine.current().await {
        Ok(current) if current.created => {
            Json(ScoreboardResponse::created(current.scoreboard)).into_response()
        }
        Ok(current) => Json(ScoreboardResponse::found(current.scoreboard)).into_response(),
        Err(e) => mutation_error_to_response(e),
    }
}

/// GET /api/scoreboard/:id/balls
async fn ball_log(
    Extension(services): Extension<AppServices>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ScoreboardId = match id.parse() {
        Ok(id) => id,
        Err(e) => {
            return json_error(StatusCode::BAD_REQUEST, "Invalid scoreboard id", e.to_string());
        }
    };

    match services.engine.ball_log(id).await {
        Ok(balls) => Json(json!({
            "code": 200,
            "message": "Ball log found",
            "data": balls,
        }))
        .into_response(),
        Err(e) => mutation_error_to_response(e),
    }
}
