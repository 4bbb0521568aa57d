use std::time::Duration;

use cricket_api::app::services::{AppServices, build_in_memory_services};
use cricket_api::config::AppConfig;
use cricket_core::ConnectionId;
use cricket_scoring::{BallPayload, BallType, ScoreboardId};
use futures::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message as WsMessage;

type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    base_url: String,
    services: AppServices,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory wiring, ephemeral port.
        let services = build_in_memory_services(&AppConfig::default());
        let app = cricket_api::app::router(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_json(client: &reqwest::Client, url: String) -> (StatusCode, serde_json::Value) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn scoreboard_is_created_once_then_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/scoreboard", srv.base_url);

    let (status, first) = get_json(&client, url.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["code"], 200);
    assert_eq!(first["message"], "New scoreboard created");
    assert_eq!(first["data"]["team_scoreboard"]["total_runs"], 0);
    assert!(first["data"]["players"].as_object().unwrap().is_empty());

    let (status, second) = get_json(&client, url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "Scoreboard found");
    assert_eq!(second["data"]["_id"], first["data"]["_id"]);
}

#[tokio::test]
async fn scored_balls_show_up_on_the_scoreboard_and_in_the_ball_log() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (_, body) = get_json(&client, format!("{}/api/scoreboard", srv.base_url)).await;
    let id: ScoreboardId = body["data"]["_id"].as_str().unwrap().parse().unwrap();

    srv.services
        .engine
        .apply_event(
            id,
            &BallType::Tag("run".to_string()),
            BallPayload::new("A", "B").with_runs(4),
        )
        .await
        .unwrap();
    srv.services
        .engine
        .apply_event(
            id,
            &BallType::Tag("wide".to_string()),
            BallPayload::new("A", "B"),
        )
        .await
        .unwrap();

    let (_, body) = get_json(&client, format!("{}/api/scoreboard", srv.base_url)).await;
    assert_eq!(body["data"]["team_scoreboard"]["total_runs"], 4);
    assert_eq!(body["data"]["team_scoreboard"]["total_balls"], 1);
    assert_eq!(body["data"]["team_scoreboard"]["total_wide_balls"], 1);
    assert_eq!(body["data"]["players"]["A"]["runs"], 4);

    let (status, balls) =
        get_json(&client, format!("{}/api/scoreboard/{}/balls", srv.base_url, id)).await;
    assert_eq!(status, StatusCode::OK);
    let balls = balls["data"].as_array().unwrap();
    assert_eq!(balls.len(), 2);
    assert_eq!(balls[0]["sequence_number"], 1);
    assert_eq!(balls[0]["payload"]["tag"], "run");
    assert_eq!(balls[1]["sequence_number"], 2);
    assert_eq!(balls[1]["payload"]["tag"], "wide");
}

#[tokio::test]
async fn ball_log_rejects_unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(
        &client,
        format!("{}/api/scoreboard/{}/balls", srv.base_url, ScoreboardId::generate()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let (status, body) =
        get_json(&client, format!("{}/api/scoreboard/not-a-uuid/balls", srv.base_url)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid scoreboard id");
}

#[tokio::test]
async fn sse_viewers_receive_scoreboard_updates() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let current = srv.services.engine.current().await.unwrap();
    let id = current.scoreboard.id_typed();

    let mut res = client
        .get(format!("{}/api/scoreboard/stream", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let outcome = srv
        .services
        .engine
        .apply_event(
            id,
            &BallType::Tag("run".to_string()),
            BallPayload::new("A", "B").with_runs(6),
        )
        .await;
    srv.services
        .coordinator
        .report(ConnectionId::new(), cricket_api::app::broadcast::Operation::NewBall, outcome);

    let mut received = String::new();
    let read = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(chunk) = res.chunk().await.unwrap() {
            received.push_str(&String::from_utf8_lossy(&chunk));
            if received.contains("\"total_runs\":6") {
                break;
            }
        }
    })
    .await;

    assert!(read.is_ok(), "no scoreboard update within timeout: {received}");
    assert!(received.contains("event: updatedScoreboard"));
}

async fn connect_ws(base_url: &str) -> WsClient {
    let url = format!("{}/ws", base_url.replacen("http://", "ws://", 1));
    let (ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    ws
}

async fn send_frame(ws: &mut WsClient, event: &str, data: serde_json::Value) {
    let text = json!({ "event": event, "data": data }).to_string();
    ws.send(WsMessage::text(text)).await.unwrap();
}

/// Next JSON frame, or `None` if nothing arrives within `wait`.
async fn next_frame(ws: &mut WsClient, wait: Duration) -> Option<serde_json::Value> {
    tokio::time::timeout(wait, async {
        loop {
            let msg = ws.next().await?.ok()?;
            if let Ok(text) = msg.to_text() {
                if !text.is_empty() {
                    return serde_json::from_str(text).ok();
                }
            }
        }
    })
    .await
    .ok()
    .flatten()
}

#[tokio::test]
async fn websocket_relays_skip_the_sender_and_updates_reach_everyone() {
    let srv = TestServer::spawn().await;
    let current = srv.services.engine.current().await.unwrap();
    let id = current.scoreboard.id_typed().to_string();

    let mut scorer = connect_ws(&srv.base_url).await;
    let mut viewer = connect_ws(&srv.base_url).await;

    // The viewer subscribes once its upgrade completes; resend until it hears one.
    let mut relayed = None;
    for attempt in 0..50 {
        send_frame(&mut scorer, "save_event_to_database", json!({ "attempt": attempt })).await;
        if let Some(frame) = next_frame(&mut viewer, Duration::from_millis(100)).await {
            relayed = Some(frame);
            break;
        }
    }
    let relayed = relayed.expect("viewer never received the relayed action");
    assert_eq!(relayed["event"], "set_current_action");

    send_frame(
        &mut scorer,
        "new-ball",
        json!({
            "scoreboardId": id,
            "type": "run",
            "payload": { "runs": 2, "onstrike": "A", "bowler": "B" }
        }),
    )
    .await;

    // Relays never reached the scorer, so its first frame is the update.
    let own = next_frame(&mut scorer, Duration::from_secs(5)).await.unwrap();
    assert_eq!(own["event"], "updatedScoreboard");
    assert_eq!(own["data"][0]["team_scoreboard"]["total_runs"], 2);

    let seen = loop {
        let frame = next_frame(&mut viewer, Duration::from_secs(5)).await.unwrap();
        if frame["event"] == "updatedScoreboard" {
            break frame;
        }
        assert_eq!(frame["event"], "set_current_action");
    };
    assert_eq!(seen["data"][0]["players"]["A"]["runs"], 2);
}

#[tokio::test]
async fn websocket_errors_go_back_to_the_sender_only() {
    let srv = TestServer::spawn().await;
    let current = srv.services.engine.current().await.unwrap();
    let id = current.scoreboard.id_typed().to_string();

    let mut scorer = connect_ws(&srv.base_url).await;
    let mut viewer = connect_ws(&srv.base_url).await;

    // Wait until the viewer is subscribed.
    let mut ready = false;
    for _ in 0..50 {
        send_frame(&mut scorer, "clear_striker_input", serde_json::Value::Null).await;
        if next_frame(&mut viewer, Duration::from_millis(100)).await.is_some() {
            ready = true;
            break;
        }
    }
    assert!(ready, "viewer never subscribed");

    send_frame(
        &mut scorer,
        "set_swap_players",
        json!({ "scoreboardId": id, "striker": "X", "nonStriker": "Y" }),
    )
    .await;

    let err = next_frame(&mut scorer, Duration::from_secs(5)).await.unwrap();
    assert_eq!(err["event"], "error");
    assert_eq!(err["data"]["message"], "Swap Striker Non Striker Error!");

    // Drain any late relays; no error frame may follow for the viewer.
    while let Some(frame) = next_frame(&mut viewer, Duration::from_millis(300)).await {
        assert_eq!(frame["event"], "striker_input_cleaned");
    }
}
