//! WebSocket handler for live game communication.
//!
//! One connection per (room, player). The receive side only parses
//! frames and forwards commands into the room's inbox; the send side
//! pumps the player's session channel out to the socket. Room state is
//! never touched from here.

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use holdem_core::game::constants::SESSION_CHANNEL_CAPACITY;
use holdem_core::room::{
    actor::RoomHandle,
    messages::RoomCommand,
    protocol::{ClientMessage, ServerMessage},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub name: Option<String>,
}

/// Upgrade to a WebSocket bound to `(room_id, player_id)`. The player is
/// seated on connect (or re-attached when the id is already seated) and
/// immediately receives a snapshot.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path((room_id, player_id)): Path<(String, String)>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let Some(room) = state.registry.get(&room_id).await else {
        return (StatusCode::NOT_FOUND, "room not found").into_response();
    };
    let name = query.name.unwrap_or_else(|| {
        let prefix: String = player_id.chars().take(6).collect();
        format!("Player_{prefix}")
    });
    ws.on_upgrade(move |socket| handle_socket(socket, room, player_id, name))
}

async fn handle_socket(socket: WebSocket, room: RoomHandle, player_id: String, name: String) {
    let (mut sink, mut stream) = socket.split();

    // Seat the player and bind their outbound channel.
    let (conn_tx, mut conn_rx) = mpsc::channel::<ServerMessage>(SESSION_CHANNEL_CAPACITY);
    let (join_tx, join_rx) = oneshot::channel();
    if room
        .send(RoomCommand::Join {
            player_id: player_id.clone(),
            name: name.clone(),
            conn: conn_tx.clone(),
            respond: join_tx,
        })
        .await
        .is_err()
    {
        return;
    }
    match join_rx.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            let frame = ServerMessage::Error {
                code: err.code().to_string(),
                message: err.to_string(),
            };
            if let Ok(json) = serde_json::to_string(&frame) {
                let _ = sink.send(Message::Text(json.into())).await;
            }
            return;
        }
        Err(_) => return,
    }
    info!("ws connected: room={} player={}", room.room_id(), player_id);

    // Outbound pump: session channel -> socket.
    let send_task = tokio::spawn(async move {
        while let Some(message) = conn_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    warn!("failed to serialize outbound frame: {e}");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: socket -> room inbox.
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    let leaving = message == ClientMessage::Leave;
                    if room
                        .send(RoomCommand::Client {
                            player_id: player_id.clone(),
                            message,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                    if leaving {
                        break;
                    }
                }
                Err(e) => {
                    debug!("unparseable frame from {player_id}: {e}");
                    let _ = conn_tx
                        .send(ServerMessage::Error {
                            code: "invalid_message".to_string(),
                            message: "invalid message format".to_string(),
                        })
                        .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!("ws error for {player_id}: {e}");
                break;
            }
            _ => {}
        }
    }

    // The seat survives the transport; only the channel is marked dead.
    send_task.abort();
    let _ = room
        .send(RoomCommand::Disconnected {
            player_id: player_id.clone(),
        })
        .await;
    info!("ws disconnected: room={} player={}", room.room_id(), player_id);
}
