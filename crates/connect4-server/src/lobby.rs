//! Room registry backing the lobby listing.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use connect4_core::protocol::RoomSummary;

use crate::room::Room;

/// Shared registry of game rooms, keyed by room id.
///
/// A `BTreeMap` keeps the lobby listing in a stable order.
pub struct Lobby {
    rooms: RwLock<BTreeMap<String, Arc<Mutex<Room>>>>,
}

impl Lobby {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a room if the id is not already taken.
    pub async fn create_room(&self, room_id: &str) -> Arc<Mutex<Room>> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Room::new(room_id))))
            .clone()
    }

    pub async fn get_room(&self, room_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Occupancy of every room, for `GET /rooms`.
    pub async fn rooms_info(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.read().await;
        let mut info = Vec::with_capacity(rooms.len());
        for (room_id, room) in rooms.iter() {
            let room = room.lock().await;
            info.push(RoomSummary {
                room_id: room_id.clone(),
                players: room.player_count(),
                is_full: room.is_full(),
            });
        }
        info
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}
