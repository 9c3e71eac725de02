//! Repository / port trait definitions.
//!
//! The domain defines the interfaces it needs; infrastructure provides the
//! implementations (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::{NewMessage, StoredMessage, UserIdentity},
    error::{AuthError, RepositoryError},
    value_object::{RoomId, Timestamp, UserId},
};

/// Durable message store.
///
/// The store is the sole writer of message records: it assigns the id and the
/// authoritative timestamp.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message and return the committed record
    async fn persist(&self, message: NewMessage) -> Result<StoredMessage, RepositoryError>;

    /// Fetch up to `limit` messages of `room_id` created strictly before
    /// `before`, newest first
    async fn fetch_before(
        &self,
        room_id: &RoomId,
        before: Timestamp,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RepositoryError>;
}

/// Lookup of user records and their community memberships
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user with the membership snapshot, `None` when unknown
    async fn find_identity(&self, user_id: &UserId)
    -> Result<Option<UserIdentity>, RepositoryError>;
}

/// Turns a bearer credential into a verified identity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<UserIdentity, AuthError>;
}
