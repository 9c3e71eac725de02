//! Live client connection handle.
//!
//! A `ClientHandle` is what the room registry stores. It never touches the
//! socket: frames go through a bounded queue drained by the connection's own
//! writer task, and closing cancels a token observed by that connection's
//! read and write loops.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{
    entity::UserProfile,
    error::MessagePushError,
    value_object::{ConnectionId, RoomId},
};

/// Sending half of a client's outbound frame queue
pub type OutboundSender = mpsc::Sender<String>;
/// Receiving half of a client's outbound frame queue (owned by the writer task)
pub type OutboundReceiver = mpsc::Receiver<String>;

#[derive(Debug)]
pub struct ClientHandle {
    pub connection_id: ConnectionId,
    pub user: UserProfile,
    pub room_id: RoomId,
    outbound: OutboundSender,
    closed: AtomicBool,
    shutdown: CancellationToken,
}

impl ClientHandle {
    /// Create a handle and the receiving end of its outbound queue.
    ///
    /// `buffer` bounds how many frames may wait for a slow client. It must be
    /// greater than zero.
    pub fn new(user: UserProfile, room_id: RoomId, buffer: usize) -> (Self, OutboundReceiver) {
        let (outbound, rx) = mpsc::channel(buffer.max(1));
        let handle = Self {
            connection_id: ConnectionId::generate(),
            user,
            room_id,
            outbound,
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        };
        (handle, rx)
    }

    /// Queue a frame without waiting
    pub fn try_push(&self, frame: String) -> Result<(), MessagePushError> {
        if self.is_closed() {
            return Err(MessagePushError::Closed);
        }
        self.outbound.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MessagePushError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => MessagePushError::Closed,
        })
    }

    /// Close the connection.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::AcqRel);
        self.shutdown.cancel();
        first
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolves once [`ClientHandle::close`] has been called
    pub async fn closed(&self) {
        self.shutdown.cancelled().await
    }
}
