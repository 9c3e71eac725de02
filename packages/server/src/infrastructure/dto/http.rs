//! HTTP API DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserColor;

/// Query string of the history endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub community_id: Option<String>,
    pub last_message_time: Option<String>,
}

/// Envelope shared by every HTTP API response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            message: None,
            data: Some(data),
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// One message inside a history group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedMessageDto {
    pub id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// History group as rendered by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageGroupDto {
    pub message_group_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub username: String,
    pub user_profile_pic: String,
    pub user_color: UserColor,
    pub messages: Vec<GroupedMessageDto>,
}

/// Live presence of a room (debug endpoint)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPresenceDto {
    pub community_id: Uuid,
    pub connected_clients: usize,
}
