//! Per-room session map: one outbound channel per seated player.
//!
//! A transport drop marks the seat disconnected but does not free it;
//! the room decides when a seat is actually removed, so a player can
//! reconnect into the same hand.

use std::collections::HashMap;

use tokio::sync::mpsc::{self, error::TrySendError};

use super::protocol::ServerMessage;
use crate::game::table::PlayerId;

#[derive(Debug)]
struct Connection {
    sender: mpsc::Sender<ServerMessage>,
    connected: bool,
}

#[derive(Debug, Default)]
pub struct Sessions {
    connections: HashMap<PlayerId, Connection>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or rebind, on reconnect) a player's outbound channel.
    pub fn attach(&mut self, player: &str, sender: mpsc::Sender<ServerMessage>) {
        self.connections.insert(
            player.to_string(),
            Connection {
                sender,
                connected: true,
            },
        );
    }

    pub fn disconnect(&mut self, player: &str) {
        if let Some(conn) = self.connections.get_mut(player) {
            conn.connected = false;
        }
    }

    pub fn remove(&mut self, player: &str) {
        self.connections.remove(player);
    }

    pub fn is_connected(&self, player: &str) -> bool {
        self.connections.get(player).is_some_and(|c| c.connected)
    }

    pub fn send(&mut self, player: &str, message: ServerMessage) {
        let Some(conn) = self.connections.get(player) else {
            return;
        };
        if !conn.connected {
            return;
        }
        match conn.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                log::warn!("outbound channel full for {player}, dropping message");
            }
            Err(TrySendError::Closed(_)) => {
                self.disconnect(player);
            }
        }
    }

    /// Send the same message to every connected player.
    pub fn broadcast(&mut self, message: ServerMessage) {
        self.broadcast_with(|_| Some(message.clone()));
    }

    /// Send each connected player a message of their own; `make`
    /// returning `None` skips that player.
    pub fn broadcast_with<F>(&mut self, mut make: F)
    where
        F: FnMut(&str) -> Option<ServerMessage>,
    {
        let mut dead: Vec<PlayerId> = Vec::new();
        for (player, conn) in &self.connections {
            if !conn.connected {
                continue;
            }
            let Some(message) = make(player) else {
                continue;
            };
            match conn.sender.try_send(message) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    log::warn!("outbound channel full for {player}, dropping message");
                }
                Err(TrySendError::Closed(_)) => dead.push(player.clone()),
            }
        }
        for player in dead {
            self.disconnect(&player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::SESSION_CHANNEL_CAPACITY;

    #[tokio::test]
    async fn send_reaches_attached_player() {
        let mut sessions = Sessions::new();
        let (tx, mut rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        sessions.attach("p1", tx);
        sessions.send("p1", ServerMessage::RoomClosed);
        assert_eq!(rx.recv().await, Some(ServerMessage::RoomClosed));
    }

    #[tokio::test]
    async fn disconnected_player_keeps_slot_but_gets_nothing() {
        let mut sessions = Sessions::new();
        let (tx, mut rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        sessions.attach("p1", tx);
        sessions.disconnect("p1");
        sessions.send("p1", ServerMessage::RoomClosed);
        assert!(rx.try_recv().is_err());

        // Reconnect replaces the channel and delivery resumes.
        let (tx2, mut rx2) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        sessions.attach("p1", tx2);
        assert!(sessions.is_connected("p1"));
        sessions.send("p1", ServerMessage::RoomClosed);
        assert_eq!(rx2.recv().await, Some(ServerMessage::RoomClosed));
    }

    #[tokio::test]
    async fn broadcast_with_personalises_per_player() {
        let mut sessions = Sessions::new();
        let (tx1, mut rx1) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let (tx2, mut rx2) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        sessions.attach("p1", tx1);
        sessions.attach("p2", tx2);

        sessions.broadcast_with(|player| {
            Some(ServerMessage::Error {
                code: "test".to_string(),
                message: player.to_string(),
            })
        });

        let ServerMessage::Error { message, .. } = rx1.recv().await.unwrap() else {
            panic!("expected an error frame");
        };
        assert_eq!(message, "p1");
        let ServerMessage::Error { message, .. } = rx2.recv().await.unwrap() else {
            panic!("expected an error frame");
        };
        assert_eq!(message, "p2");
    }

    #[tokio::test]
    async fn dropped_receiver_marks_disconnect() {
        let mut sessions = Sessions::new();
        let (tx, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        sessions.attach("p1", tx);
        drop(rx);
        sessions.broadcast(ServerMessage::RoomClosed);
        assert!(!sessions.is_connected("p1"));
    }
}
