//! WebSocket frame DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserColor;

/// Server → client event for one persisted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEventDto {
    pub message_group_id: Uuid,
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub username: String,
    pub user_profile_pic: String,
    pub user_color: UserColor,
    pub community_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Structured error frame written before a rejected connection is closed,
/// and as a negative acknowledgement for a message that failed to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrameDto {
    pub code: u16,
    pub message: String,
}

impl ErrorFrameDto {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
