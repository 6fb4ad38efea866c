//! Room actor command types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::protocol::{ClientMessage, ServerMessage, Snapshot};
use crate::game::table::{ActionError, PlayerId};

/// Commands accepted by a room actor's inbox. Inbound transport handlers
/// only parse and forward; the actor is the sole writer of room state.
#[derive(Debug)]
pub enum RoomCommand {
    /// Seat a player (or re-attach a reconnecting one) and bind their
    /// outbound channel.
    Join {
        player_id: PlayerId,
        name: String,
        conn: mpsc::Sender<ServerMessage>,
        respond: oneshot::Sender<Result<(), ActionError>>,
    },

    /// A parsed client frame: action, chat, start, or leave.
    Client {
        player_id: PlayerId,
        message: ClientMessage,
    },

    /// Transport dropped; the seat stays until the player leaves.
    Disconnected { player_id: PlayerId },

    /// Viewer snapshot for the HTTP state endpoint.
    GetSnapshot {
        player_id: PlayerId,
        respond: oneshot::Sender<Option<Box<Snapshot>>>,
    },

    /// Lobby listing data.
    GetSummary {
        respond: oneshot::Sender<RoomSummary>,
    },

    /// Close the room: notify clients and stop the actor.
    Shutdown,
}

/// What the lobby shows about a room.
#[derive(Clone, Debug, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub stage: String,
    pub mode: String,
}
