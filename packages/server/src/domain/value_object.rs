//! Value objects.
//!
//! Identifiers are UUID newtypes so a room id can never be passed where a
//! user id is expected. Text input is validated once here and trusted
//! everywhere else.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new(value: Uuid) -> Self {
                Self(value)
            }

            /// Generate a fresh random (v4) identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = ValueObjectError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValueObjectError::InvalidId {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Room (community) identifier
    RoomId,
    "room id"
);
uuid_id!(
    /// User identifier
    UserId,
    "user id"
);
uuid_id!(
    /// Identifier assigned to a message by persistence
    MessageId,
    "message id"
);
uuid_id!(
    /// Identifier of one live connection
    ConnectionId,
    "connection id"
);
uuid_id!(
    /// Identifier of a derived message group (fresh per broadcast / history read)
    MessageGroupId,
    "message group id"
);

/// Color tag attached to a user for chat rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserColor {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Brown,
    Teal,
}

impl UserColor {
    pub const ALL: [UserColor; 9] = [
        UserColor::Red,
        UserColor::Blue,
        UserColor::Green,
        UserColor::Yellow,
        UserColor::Orange,
        UserColor::Purple,
        UserColor::Pink,
        UserColor::Brown,
        UserColor::Teal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserColor::Red => "red",
            UserColor::Blue => "blue",
            UserColor::Green => "green",
            UserColor::Yellow => "yellow",
            UserColor::Orange => "orange",
            UserColor::Purple => "purple",
            UserColor::Pink => "pink",
            UserColor::Brown => "brown",
            UserColor::Teal => "teal",
        }
    }
}

impl FromStr for UserColor {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserColor::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValueObjectError::UnknownColor(s.to_string()))
    }
}

/// Role carried by an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    AppUser,
    AdminUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::AppUser => "app_user",
            Role::AdminUser => "admin_user",
        }
    }
}

impl FromStr for Role {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app_user" => Ok(Role::AppUser),
            "admin_user" => Ok(Role::AdminUser),
            other => Err(ValueObjectError::UnknownRole(other.to_string())),
        }
    }
}

/// Chat message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    /// Maximum number of characters accepted in a single message
    pub const MAX_LEN: usize = 4096;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyMessageContent);
        }
        let len = value.chars().count();
        if len > Self::MAX_LEN {
            return Err(ValueObjectError::MessageContentTooLong {
                max: Self::MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Instant assigned by persistence (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_parses_uuid() {
        // テスト項目: UUID 文字列から RoomId を生成できる
        // given (前提条件):
        let raw = "6f1c1b9e-3f5c-4f2a-9d59-2b8f1f0b7c11";

        // when (操作):
        let room_id: RoomId = raw.parse().unwrap();

        // then (期待する結果):
        assert_eq!(room_id.to_string(), raw);
    }

    #[test]
    fn test_room_id_rejects_malformed_value() {
        // テスト項目: UUID でない文字列は InvalidId エラーになる
        // given (前提条件):
        let raw = "not-a-room";

        // when (操作):
        let result = RoomId::try_from(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::InvalidId {
                kind: "room id",
                value: "not-a-room".to_string(),
            })
        );
    }

    #[test]
    fn test_message_content_rejects_blank() {
        // テスト項目: 空白のみのメッセージは拒否される
        // given (前提条件):

        // when (操作):
        let empty = MessageContent::new(String::new());
        let blank = MessageContent::new("  \n\t".to_string());

        // then (期待する結果):
        assert_eq!(empty, Err(ValueObjectError::EmptyMessageContent));
        assert_eq!(blank, Err(ValueObjectError::EmptyMessageContent));
    }

    #[test]
    fn test_message_content_length_limit_counts_characters() {
        // テスト項目: 文字数上限はバイト数ではなく文字数で判定される
        // given (前提条件):
        let at_limit = "あ".repeat(MessageContent::MAX_LEN);
        let over_limit = "a".repeat(MessageContent::MAX_LEN + 1);

        // when (操作):
        let ok = MessageContent::new(at_limit);
        let too_long = MessageContent::new(over_limit);

        // then (期待する結果):
        assert!(ok.is_ok());
        assert_eq!(
            too_long,
            Err(ValueObjectError::MessageContentTooLong {
                max: MessageContent::MAX_LEN,
                actual: MessageContent::MAX_LEN + 1,
            })
        );
    }

    #[test]
    fn test_message_content_keeps_surrounding_whitespace() {
        // テスト項目: 前後の空白は保存される（トリムしない）
        // given (前提条件):
        let raw = "  hello  ".to_string();

        // when (操作):
        let content = MessageContent::new(raw.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(content.as_str(), raw);
    }

    #[test]
    fn test_user_color_wire_names() {
        // テスト項目: UserColor は小文字の文字列としてシリアライズされ、相互変換できる
        // given (前提条件):

        // when (操作):
        let json = serde_json::to_string(&UserColor::Teal).unwrap();

        // then (期待する結果):
        assert_eq!(json, "\"teal\"");
        for color in UserColor::ALL {
            assert_eq!(color.as_str().parse::<UserColor>(), Ok(color));
        }
        assert!("magenta".parse::<UserColor>().is_err());
    }

    #[test]
    fn test_role_roundtrip() {
        // テスト項目: Role は snake_case の文字列と相互変換できる
        // given (前提条件):

        // when (操作):
        let json = serde_json::to_string(&Role::AppUser).unwrap();

        // then (期待する結果):
        assert_eq!(json, "\"app_user\"");
        assert_eq!("admin_user".parse::<Role>(), Ok(Role::AdminUser));
        assert!("guest".parse::<Role>().is_err());
    }
}
