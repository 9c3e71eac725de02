//! Domain layer for the messaging core.
//!
//! This module contains business rules that are independent of transport,
//! storage and wire formats.

pub mod broadcaster;
pub mod client;
pub mod connection;
pub mod entity;
pub mod error;
pub mod message_group;
pub mod repository;
pub mod room_registry;
pub mod value_object;

pub use broadcaster::{BroadcastReport, MessageBroadcaster};
#[cfg(test)]
pub use broadcaster::MockMessageBroadcaster;
pub use client::{ClientHandle, OutboundReceiver, OutboundSender};
pub use connection::{ConnectionLifecycle, ConnectionState};
pub use entity::{GroupedMessage, MessageGroup, NewMessage, StoredMessage, UserIdentity, UserProfile};
pub use error::{
    AuthError, ConnectionStateError, MessagePushError, RepositoryError, ValueObjectError,
};
pub use message_group::{GROUPING_WINDOW_SECS, group_messages, grouping_window};
pub use repository::{IdentityProvider, MessageRepository, UserDirectory};
#[cfg(test)]
pub use repository::{MockIdentityProvider, MockMessageRepository, MockUserDirectory};
pub use room_registry::RoomRegistry;
pub use value_object::{
    ConnectionId, MessageContent, MessageGroupId, MessageId, Role, RoomId, Timestamp, UserColor,
    UserId,
};
