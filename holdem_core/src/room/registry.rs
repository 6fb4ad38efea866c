//! Process-wide room registry: create, look up, list, and drop rooms.
//!
//! The registry holds only handles; every room's state lives inside its
//! own actor task. The map lock is never held across room work.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, oneshot};
use uuid::Uuid;

use super::actor::{RoomActor, RoomHandle};
use super::messages::{RoomCommand, RoomSummary};
use crate::game::table::TableConfig;

pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, RoomHandle>>,
    turn_timeout: Duration,
}

impl RoomRegistry {
    pub fn new(turn_timeout: Duration) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            turn_timeout,
        }
    }

    /// Spawn a room actor and register its handle. The actor task
    /// deregisters itself when the room closes or empties.
    pub async fn create_room(self: &Arc<Self>, config: TableConfig) -> RoomHandle {
        let room_id = Uuid::new_v4().to_string()[..8].to_uppercase();
        let (actor, handle) = RoomActor::new(room_id.clone(), config, self.turn_timeout);

        self.rooms
            .write()
            .await
            .insert(room_id.clone(), handle.clone());

        let registry = Arc::clone(self);
        tokio::spawn(async move {
            actor.run().await;
            registry.remove(&room_id).await;
        });

        log::info!("created room {}", handle.room_id());
        handle
    }

    pub async fn get(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn remove(&self, room_id: &str) {
        if self.rooms.write().await.remove(room_id).is_some() {
            log::info!("removed room {room_id}");
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Gather lobby summaries. Handles are cloned out first so no room
    /// is queried while the map lock is held.
    pub async fn list(&self) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let (tx, rx) = oneshot::channel();
            if handle
                .send(RoomCommand::GetSummary { respond: tx })
                .await
                .is_err()
            {
                continue;
            }
            if let Ok(summary) = rx.await {
                summaries.push(summary);
            }
        }
        summaries
    }
}
