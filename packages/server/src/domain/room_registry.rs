//! Room registry port.

use std::sync::Arc;

use super::{client::ClientHandle, value_object::RoomId};

/// Live membership of rooms.
///
/// All operations are safe to call concurrently and never fail. Implementors
/// must not perform I/O while holding their internal lock.
pub trait RoomRegistry: Send + Sync {
    /// Add a client to its room, creating the room entry on first join.
    /// Joining twice with the same handle keeps a single entry.
    fn join(&self, client: Arc<ClientHandle>);

    /// Remove a client from its room and close its connection.
    /// Deletes the room entry when it becomes empty. Returns whether an entry
    /// was removed; calling it again is a no-op.
    fn leave(&self, client: &ClientHandle) -> bool;

    /// Copy of the current members of a room
    fn snapshot(&self, room_id: &RoomId) -> Vec<Arc<ClientHandle>>;

    fn member_count(&self, room_id: &RoomId) -> usize;

    /// Number of rooms with at least one live client
    fn room_count(&self) -> usize;

    /// Remove and close every registered client. Returns how many were closed.
    fn close_all(&self) -> usize;
}
