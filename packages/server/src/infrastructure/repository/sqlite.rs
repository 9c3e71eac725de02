//! SQLite storage adapter.
//!
//! Implements both [`MessageRepository`] and [`UserDirectory`] on one pool.
//! Identifiers are stored as TEXT (hyphenated UUID) and instants as INTEGER
//! microseconds since the Unix epoch.

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tsudoi_shared::time::Clock;
use uuid::Uuid;

use crate::domain::{
    MessageContent, MessageId, MessageRepository, NewMessage, RepositoryError, Role, RoomId,
    StoredMessage, Timestamp, UserColor, UserDirectory, UserId, UserIdentity, UserProfile,
};

type MessageRow = (String, String, String, i64, String, String, String, String, String);
type UserRow = (String, String, String, String, String, String);

pub struct SqliteStore {
    pool: Pool<Sqlite>,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    /// Open (creating the file when missing) the database at `database_url`
    pub async fn connect(database_url: &str, clock: Arc<dyn Clock>) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage)?
            .create_if_missing(true);
        // Every connection to `:memory:` is its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(storage)?;

        tracing::info!("Connected to database at {}", database_url);
        Ok(Self { pool, clock })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Create tables and indexes when they do not exist yet
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        tracing::info!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                username TEXT NOT NULL UNIQUE,
                profile_pic TEXT NOT NULL DEFAULT '',
                color TEXT NOT NULL,
                role TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS community_members (
                community_id TEXT NOT NULL,
                user_id TEXT NOT NULL REFERENCES users(id),
                PRIMARY KEY (community_id, user_id)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                community_id TEXT NOT NULL,
                user_id TEXT NOT NULL REFERENCES users(id),
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_community_created
            ON messages (community_id, created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    /// Insert or update a user record (membership is left untouched)
    pub async fn upsert_user(&self, profile: &UserProfile, role: Role) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, username, profile_pic, color, role)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                username = excluded.username,
                profile_pic = excluded.profile_pic,
                color = excluded.color,
                role = excluded.role
            "#,
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.name)
        .bind(&profile.username)
        .bind(&profile.profile_pic)
        .bind(profile.color.as_str())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    /// Record that a user belongs to a community
    pub async fn add_member(&self, room_id: &RoomId, user_id: &UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR IGNORE INTO community_members (community_id, user_id) VALUES (?1, ?2)",
        )
        .bind(room_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for SqliteStore {
    async fn persist(&self, message: NewMessage) -> Result<StoredMessage, RepositoryError> {
        let id = MessageId::generate();
        let created_at = Timestamp::new(self.clock.now());

        sqlx::query(
            r#"
            INSERT INTO messages (id, community_id, user_id, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.to_string())
        .bind(message.room_id.to_string())
        .bind(message.author.user_id.to_string())
        .bind(message.content.as_str())
        .bind(created_at.value().timestamp_micros())
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(StoredMessage {
            id,
            room_id: message.room_id,
            author: message.author,
            content: message.content,
            created_at,
        })
    }

    async fn fetch_before(
        &self,
        room_id: &RoomId,
        before: Timestamp,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.community_id, m.content, m.created_at,
                   u.id, u.name, u.username, u.profile_pic, u.color
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.community_id = ?1 AND m.created_at < ?2
            ORDER BY m.created_at DESC, m.seq DESC
            LIMIT ?3
            "#,
        )
        .bind(room_id.to_string())
        .bind(before.value().timestamp_micros())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter().map(message_from_row).collect()
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn find_identity(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserIdentity>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, username, profile_pic, color, role FROM users WHERE id = ?1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        let Some((id, name, username, profile_pic, color, role)) = row else {
            return Ok(None);
        };

        let communities: Vec<String> = sqlx::query_scalar(
            "SELECT community_id FROM community_members WHERE user_id = ?1 ORDER BY community_id",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        let joined_rooms = communities
            .iter()
            .map(|c| RoomId::from_str(c).map_err(corrupted))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(UserIdentity {
            profile: profile_from_columns(&id, name, username, profile_pic, &color)?,
            role: Role::from_str(&role).map_err(corrupted)?,
            joined_rooms,
        }))
    }
}

fn message_from_row(row: MessageRow) -> Result<StoredMessage, RepositoryError> {
    let (id, community_id, content, created_at, user_id, name, username, profile_pic, color) = row;
    let created_at = DateTime::<Utc>::from_timestamp_micros(created_at)
        .ok_or_else(|| RepositoryError::Corrupted(format!("timestamp out of range: {created_at}")))?;

    Ok(StoredMessage {
        id: MessageId::from_str(&id).map_err(corrupted)?,
        room_id: RoomId::from_str(&community_id).map_err(corrupted)?,
        author: profile_from_columns(&user_id, name, username, profile_pic, &color)?,
        content: MessageContent::new(content).map_err(corrupted)?,
        created_at: Timestamp::new(created_at),
    })
}

fn profile_from_columns(
    user_id: &str,
    name: String,
    username: String,
    profile_pic: String,
    color: &str,
) -> Result<UserProfile, RepositoryError> {
    Ok(UserProfile {
        user_id: UserId::new(Uuid::parse_str(user_id).map_err(corrupted)?),
        name,
        username,
        profile_pic,
        color: UserColor::from_str(color).map_err(corrupted)?,
    })
}

fn storage(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn corrupted(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Corrupted(e.to_string())
}
