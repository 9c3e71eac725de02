//! Domain entities.

use serde::Serialize;

use super::value_object::{
    MessageContent, MessageGroupId, MessageId, Role, RoomId, Timestamp, UserColor, UserId,
};

/// Display profile of a user, denormalized onto every message for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub username: String,
    pub profile_pic: String,
    pub color: UserColor,
}

/// Verified identity resolved from a bearer credential.
///
/// `joined_rooms` is the membership snapshot taken at authentication time.
/// Membership checks for a connection use this snapshot only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub profile: UserProfile,
    pub role: Role,
    pub joined_rooms: Vec<RoomId>,
}

impl UserIdentity {
    pub fn user_id(&self) -> UserId {
        self.profile.user_id
    }

    pub fn is_member(&self, room_id: &RoomId) -> bool {
        self.joined_rooms.contains(room_id)
    }
}

/// Message submitted for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub author: UserProfile,
    pub content: MessageContent,
}

impl NewMessage {
    pub fn new(room_id: RoomId, author: UserProfile, content: MessageContent) -> Self {
        Self {
            room_id,
            author,
            content,
        }
    }
}

/// Message as committed by persistence. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub author: UserProfile,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

/// One message inside a [`MessageGroup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedMessage {
    pub id: MessageId,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}

impl From<StoredMessage> for GroupedMessage {
    fn from(message: StoredMessage) -> Self {
        Self {
            id: message.id,
            content: message.content,
            timestamp: message.created_at,
        }
    }
}

/// Run of consecutive messages by one author, ordered oldest to newest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGroup {
    pub id: MessageGroupId,
    pub author: UserProfile,
    pub messages: Vec<GroupedMessage>,
}
