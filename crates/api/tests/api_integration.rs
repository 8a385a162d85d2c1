//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use event_store::InMemoryEventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let store = InMemoryEventStore::new();
    let (state, _processor) = api::create_default_state(store);
    api::create_app(state, get_metrics_handle())
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_game(app: &axum::Router, name: &str) -> String {
    let (status, json) = send(app, "POST", "/games", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    json["game_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["games"], 0);
}

#[tokio::test]
async fn test_full_game_over_http() {
    let app = setup();
    let game_id = create_game(&app, "Friday match").await;

    for (player, team) in [("cedric", "blue"), ("franck", "red")] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/games/{game_id}/players"),
            Some(json!({ "player": player, "team": team })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, "POST", &format!("/games/{game_id}/start"), None).await;
    assert_eq!(status, StatusCode::OK);

    for player in ["cedric", "cedric", "franck"] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/games/{game_id}/goals"),
            Some(json!({ "player": player })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send(&app, "POST", &format!("/games/{game_id}/end"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ended");
    assert_eq!(json["points_blue"], 2);
    assert_eq!(json["points_red"], 1);
    assert_eq!(json["winner"], "blue");

    let (status, json) = send(&app, "GET", &format!("/games/{game_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["blue"], json!(["cedric"]));
    assert_eq!(json["red"], json!(["franck"]));

    let (status, list) = send(&app, "GET", "/games", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["status"], "ended");
    assert_eq!(list[0]["winner"], "blue");
}

#[tokio::test]
async fn test_list_games_by_status() {
    let app = setup();
    let started = create_game(&app, "a").await;
    create_game(&app, "b").await;
    send(&app, "POST", &format!("/games/{started}/start"), None).await;

    let (status, list) = send(&app, "GET", "/games?status=started", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["game_id"], started);
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/games/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("Game:nope"));

    let (status, _) = send(&app, "POST", "/games/nope/start", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/games/nope/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rule_violations_map_to_status_codes() {
    let app = setup();
    let game_id = create_game(&app, "Friday match").await;

    // Ending a game that never started
    let (status, json) = send(&app, "POST", &format!("/games/{game_id}/end"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().is_some());

    // Empty player name
    let (status, _) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/players"),
        Some(json!({ "player": "", "team": "blue" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown team
    let (status, json) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/players"),
        Some(json!({ "player": "cedric", "team": "green" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("green"));

    // Empty game name
    let (status, _) = send(&app, "POST", "/games", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejected_command_stores_nothing() {
    let app = setup();
    let game_id = create_game(&app, "Friday match").await;

    let (_, before) = send(&app, "GET", &format!("/games/{game_id}/events"), None).await;
    send(&app, "POST", &format!("/games/{game_id}/end"), None).await;
    let (_, after) = send(&app, "GET", &format!("/games/{game_id}/events"), None).await;

    assert_eq!(before.as_array().unwrap().len(), 1);
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_game_events_endpoint() {
    let app = setup();
    let game_id = create_game(&app, "Friday match").await;
    send(
        &app,
        "POST",
        &format!("/games/{game_id}/players"),
        Some(json!({ "player": "cedric", "team": "blue" })),
    )
    .await;

    let (status, events) = send(&app, "GET", &format!("/games/{game_id}/events"), None).await;
    assert_eq!(status, StatusCode::OK);

    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event_type"], "GameCreated");
    assert_eq!(events[0]["version"], 1);
    assert_eq!(events[1]["event_type"], "PlayerAddedToTeam");
    assert_eq!(events[1]["version"], 2);
    assert_eq!(events[1]["aggregate_id"], format!("Game:{game_id}"));
}

#[tokio::test]
async fn test_comment_and_review() {
    let app = setup();
    let game_id = create_game(&app, "Friday match").await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/comments"),
        Some(json!({ "author": "cedric", "text": "nice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["comments"][0]["text"], "nice");

    // Reviews need an ended game
    let review = json!({ "author": "cedric", "stars": 4, "text": "good game" });
    let (status, _) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/reviews"),
        Some(review.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, "POST", &format!("/games/{game_id}/start"), None).await;
    send(&app, "POST", &format!("/games/{game_id}/end"), None).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/reviews"),
        Some(review),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reviews"][0]["stars"], 4);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/games/{game_id}/reviews"),
        Some(json!({ "author": "cedric", "stars": 6, "text": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_game() {
    let app = setup();
    let game_id = create_game(&app, "Friday match").await;

    let (status, _) = send(&app, "DELETE", &format!("/games/{game_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/games/{game_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", &format!("/games/{game_id}/start"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, list) = send(&app, "GET", "/games", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_player_crud() {
    let app = setup();

    let (status, json) = send(&app, "POST", "/players", Some(json!({ "name": "Cedric" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let player_id = json["player_id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/players/{player_id}"),
        Some(json!({ "name": "Ced" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Ced");

    let (status, list) = send(&app, "GET", "/players", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["name"], "Ced");

    let (status, _) = send(&app, "DELETE", &format!("/players/{player_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/players/{player_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/players/{player_id}"),
        Some(json!({ "name": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, list) = send(&app, "GET", "/players", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_player_with_empty_name_is_rejected() {
    let app = setup();

    let (status, _) = send(&app, "POST", "/players", Some(json!({ "name": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    create_game(&app, "Friday match").await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}
