//! Fan-out port.

use super::entity::StoredMessage;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients the event was queued for
    pub delivered: usize,
    /// Clients removed from the room because the write failed
    pub pruned: usize,
}

/// Writes a persisted message to every live client of its room
#[cfg_attr(test, mockall::automock)]
pub trait MessageBroadcaster: Send + Sync {
    fn broadcast(&self, message: &StoredMessage) -> BroadcastReport;
}
