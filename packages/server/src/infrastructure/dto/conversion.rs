//! Conversion logic between DTOs and domain entities.

use crate::domain::{GroupedMessage, MessageGroup, MessageGroupId, StoredMessage};
use crate::infrastructure::dto::{http, websocket};

// ========================================
// Domain Entity → DTO
// ========================================

impl websocket::MessageEventDto {
    /// Build the broadcast event of a stored message under the given group id
    pub fn from_stored(message: &StoredMessage, group_id: MessageGroupId) -> Self {
        Self {
            message_group_id: group_id.as_uuid(),
            message_id: message.id.as_uuid(),
            user_id: message.author.user_id.as_uuid(),
            name: message.author.name.clone(),
            username: message.author.username.clone(),
            user_profile_pic: message.author.profile_pic.clone(),
            user_color: message.author.color,
            community_id: message.room_id.as_uuid(),
            content: message.content.as_str().to_string(),
            timestamp: message.created_at.value(),
        }
    }
}

impl From<GroupedMessage> for http::GroupedMessageDto {
    fn from(model: GroupedMessage) -> Self {
        Self {
            id: model.id.as_uuid(),
            content: model.content.into_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<MessageGroup> for http::MessageGroupDto {
    fn from(model: MessageGroup) -> Self {
        Self {
            message_group_id: model.id.as_uuid(),
            user_id: model.author.user_id.as_uuid(),
            name: model.author.name,
            username: model.author.username,
            user_profile_pic: model.author.profile_pic,
            user_color: model.author.color,
            messages: model.messages.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageContent, MessageId, RoomId, Timestamp, UserColor, UserId, UserProfile,
    };
    use chrono::{TimeZone, Utc};

    fn stored(content: &str) -> StoredMessage {
        StoredMessage {
            id: MessageId::generate(),
            room_id: RoomId::generate(),
            author: UserProfile {
                user_id: UserId::generate(),
                name: "Alice Liddell".to_string(),
                username: "alice".to_string(),
                profile_pic: "https://example.com/alice.png".to_string(),
                color: UserColor::Pink,
            },
            content: MessageContent::new(content.to_string()).unwrap(),
            created_at: Timestamp::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_stored_message_to_event_wire_shape() {
        // テスト項目: 保存済みメッセージが仕様通りの JSON フィールド名でシリアライズされる
        // given (前提条件):
        let message = stored("hello");
        let group_id = MessageGroupId::generate();

        // when (操作):
        let event = websocket::MessageEventDto::from_stored(&message, group_id);
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json["messageGroupId"], group_id.to_string());
        assert_eq!(json["messageId"], message.id.to_string());
        assert_eq!(json["userId"], message.author.user_id.to_string());
        assert_eq!(json["name"], "Alice Liddell");
        assert_eq!(json["username"], "alice");
        assert_eq!(json["userProfilePic"], "https://example.com/alice.png");
        assert_eq!(json["userColor"], "pink");
        assert_eq!(json["communityId"], message.room_id.to_string());
        assert_eq!(json["content"], "hello");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(json.as_object().unwrap().len(), 10);
    }

    #[test]
    fn test_message_group_to_dto() {
        // テスト項目: MessageGroup が履歴レスポンス用 DTO に変換される
        // given (前提条件):
        let message = stored("grouped");
        let author = message.author.clone();
        let group = MessageGroup {
            id: MessageGroupId::generate(),
            author: author.clone(),
            messages: vec![message.clone().into()],
        };

        // when (操作):
        let dto: http::MessageGroupDto = group.clone().into();
        let json = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(dto.message_group_id, group.id.as_uuid());
        assert_eq!(dto.user_id, author.user_id.as_uuid());
        assert_eq!(dto.messages.len(), 1);
        assert_eq!(dto.messages[0].id, message.id.as_uuid());
        assert_eq!(dto.messages[0].content, "grouped");
        assert_eq!(json["userProfilePic"], "https://example.com/alice.png");
        assert_eq!(json["messages"][0]["timestamp"], "2024-05-01T12:00:00Z");
    }
}
