//! HTTP/WebSocket API.
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                        - health check
//! GET  /api/rooms                     - list rooms for the lobby
//! POST /create-room                   - create a room
//! GET  /api/room/{id}/state?player_id - viewer snapshot
//! GET  /ws/{room_id}/{player_id}      - game WebSocket
//! ```
//!
//! Handlers never touch room state directly; every request is forwarded
//! into the owning room's inbox and answered via a oneshot channel.

pub mod websocket;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;

use holdem_core::game::table::{Chips, TableConfig};
use holdem_core::room::{
    messages::{RoomCommand, RoomSummary},
    protocol::Snapshot,
    registry::RoomRegistry,
};

use crate::config::ServerConfig;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub config: ServerConfig,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/rooms", get(list_rooms))
        .route("/create-room", post(create_room))
        .route("/api/room/{room_id}/state", get(room_state))
        .route("/ws/{room_id}/{player_id}", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.registry.list().await)
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub small_blind: Option<Chips>,
    #[serde(default)]
    pub big_blind: Option<Chips>,
    #[serde(default)]
    pub ante: Option<Chips>,
}

#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
}

async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, (StatusCode, String)> {
    if state.registry.room_count().await >= state.config.max_rooms {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "room limit reached".to_string(),
        ));
    }

    let betting_mode = req
        .mode
        .as_deref()
        .unwrap_or("no_limit")
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;

    // Blind sanity mirrors the lobby form: the small blind is at least
    // one chip and the big blind at least double it.
    let small_blind = req
        .small_blind
        .unwrap_or(state.config.default_small_blind)
        .max(1);
    let big_blind = req
        .big_blind
        .unwrap_or(state.config.default_big_blind)
        .max(small_blind * 2);

    let config = TableConfig {
        name: req.name,
        betting_mode,
        small_blind,
        big_blind,
        ante: req.ante.unwrap_or(0),
        buy_in: state.config.default_chips,
        ..TableConfig::default()
    };

    let handle = state.registry.create_room(config).await;
    tracing::info!("created room {} ({betting_mode})", handle.room_id());
    Ok(Json(CreateRoomResponse {
        room_id: handle.room_id().to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub player_id: String,
}

async fn room_state(
    Path(room_id): Path<String>,
    Query(query): Query<StateQuery>,
    State(state): State<AppState>,
) -> Result<Json<Box<Snapshot>>, (StatusCode, String)> {
    let handle = state
        .registry
        .get(&room_id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "room not found".to_string()))?;

    let (tx, rx) = oneshot::channel();
    handle
        .send(RoomCommand::GetSnapshot {
            player_id: query.player_id,
            respond: tx,
        })
        .await
        .map_err(|_| (StatusCode::GONE, "room is closed".to_string()))?;

    match rx.await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "not in this room".to_string())),
        Err(_) => Err((StatusCode::GONE, "room is closed".to_string())),
    }
}
