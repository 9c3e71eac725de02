//! In-memory Room Registry.
//!
//! A single mutex guards the whole `room id -> members` map. Every critical
//! section is a handful of map operations; closing a handle only cancels a
//! token, so no I/O ever happens under the lock.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::domain::{ClientHandle, ConnectionId, RoomId, RoomRegistry};

type Members = HashMap<ConnectionId, Arc<ClientHandle>>;

#[derive(Debug, Default)]
pub struct InMemoryRoomRegistry {
    rooms: Mutex<HashMap<RoomId, Members>>,
}

impl InMemoryRoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<RoomId, Members>> {
        // A panic while holding the lock cannot leave the map half-updated:
        // every mutation is a single insert/remove.
        self.rooms.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RoomRegistry for InMemoryRoomRegistry {
    fn join(&self, client: Arc<ClientHandle>) {
        let room_id = client.room_id;
        let connection_id = client.connection_id;
        let members = {
            let mut rooms = self.rooms();
            let members = rooms.entry(room_id).or_default();
            members.insert(connection_id, client);
            members.len()
        };
        tracing::debug!(
            "Connection {} joined room {} ({} member(s))",
            connection_id,
            room_id,
            members
        );
    }

    fn leave(&self, client: &ClientHandle) -> bool {
        let removed = {
            let mut rooms = self.rooms();
            match rooms.get_mut(&client.room_id) {
                Some(members) => {
                    let removed = members.remove(&client.connection_id).is_some();
                    if members.is_empty() {
                        rooms.remove(&client.room_id);
                    }
                    removed
                }
                None => false,
            }
        };

        if client.close() {
            tracing::debug!("Connection {} closed", client.connection_id);
        }
        if removed {
            tracing::debug!(
                "Connection {} left room {}",
                client.connection_id,
                client.room_id
            );
        }
        removed
    }

    fn snapshot(&self, room_id: &RoomId) -> Vec<Arc<ClientHandle>> {
        self.rooms()
            .get(room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms().get(room_id).map_or(0, HashMap::len)
    }

    fn room_count(&self) -> usize {
        self.rooms().len()
    }

    fn close_all(&self) -> usize {
        let drained: Vec<Arc<ClientHandle>> = {
            let mut rooms = self.rooms();
            rooms
                .drain()
                .flat_map(|(_, members)| members.into_values())
                .collect()
        };

        for client in &drained {
            client.close();
        }
        tracing::info!("Closed {} live connection(s)", drained.len());
        drained.len()
    }
}
