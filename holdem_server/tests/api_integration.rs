//! Lobby endpoint tests driven through the router without a socket.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use holdem_core::room::registry::RoomRegistry;
use holdem_server::api::{AppState, create_router};
use holdem_server::config::ServerConfig;

fn test_app() -> Router {
    let config = ServerConfig {
        bind: "127.0.0.1:0".parse().unwrap(),
        turn_timeout_secs: 30,
        default_chips: 1000,
        default_small_blind: 10,
        default_big_blind: 20,
        max_rooms: 4,
    };
    let registry = Arc::new(RoomRegistry::new(Duration::from_secs(
        config.turn_timeout_secs,
    )));
    create_router(AppState { registry, config })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let app = test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn created_room_appears_in_the_lobby() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/create-room",
            json!({"name": "Friday Night", "mode": "pot_limit", "small_blind": 5, "big_blind": 10}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let room_id = created["room_id"].as_str().unwrap();
    assert_eq!(room_id.len(), 8);

    let response = app
        .oneshot(Request::get("/api/rooms").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rooms = body_json(response).await;
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["id"], room_id);
    assert_eq!(rooms[0]["name"], "Friday Night");
    assert_eq!(rooms[0]["mode"], "pot_limit");
    assert_eq!(rooms[0]["stage"], "waiting");
    assert_eq!(rooms[0]["player_count"], 0);
}

#[tokio::test]
async fn unknown_betting_mode_is_rejected() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/create-room",
            json!({"name": "bad", "mode": "fixed_wager"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn state_of_missing_room_is_not_found() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::get("/api/room/NOPE/state?player_id=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn state_requires_a_seat_in_the_room() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json("/create-room", json!({"name": "t"})))
        .await
        .unwrap();
    let created = body_json(response).await;
    let room_id = created["room_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::get(format!("/api/room/{room_id}/state?player_id=ghost"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn room_limit_is_enforced() {
    let app = test_app();
    for i in 0..4 {
        let response = app
            .clone()
            .oneshot(post_json("/create-room", json!({"name": format!("r{i}")})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .oneshot(post_json("/create-room", json!({"name": "overflow"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
