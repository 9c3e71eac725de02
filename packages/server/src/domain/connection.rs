//! Connection lifecycle state machine.
//!
//! ```text
//! Connecting -> Authorized -> Joined -> Reading -> Closing -> Closed
//!     |             |           |
//!     +-> Closed    +-> Closing +-> Closing
//! ```

use super::{error::ConnectionStateError, value_object::ConnectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authorized,
    Joined,
    Reading,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        matches!(
            (self, next),
            (Connecting, Authorized)
                | (Connecting, Closed)
                | (Authorized, Joined)
                | (Authorized, Closing)
                | (Joined, Reading)
                | (Joined, Closing)
                | (Reading, Closing)
                | (Closing, Closed)
        )
    }
}

/// Tracks the state of one connection and traces each transition
#[derive(Debug)]
pub struct ConnectionLifecycle {
    label: String,
    state: ConnectionState,
}

impl ConnectionLifecycle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: ConnectionState::Connecting,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Attach the connection id once it is known
    pub fn identify(&mut self, connection_id: ConnectionId) {
        self.label = format!("{} ({})", self.label, connection_id);
    }

    pub fn transition(&mut self, next: ConnectionState) -> Result<(), ConnectionStateError> {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                "Connection {}: rejected transition {:?} -> {:?}",
                self.label,
                self.state,
                next
            );
            return Err(ConnectionStateError {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(
            "Connection {}: {:?} -> {:?}",
            self.label,
            self.state,
            next
        );
        self.state = next;
        Ok(())
    }
}
