//! InMemory User Directory 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RepositoryError, RoomId, UserDirectory, UserId, UserIdentity};

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserIdentity>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record
    pub async fn insert(&self, identity: UserIdentity) {
        self.users
            .write()
            .await
            .insert(identity.user_id(), identity);
    }

    /// Add a community membership. Returns `false` when the user is unknown.
    pub async fn add_member(&self, user_id: &UserId, room_id: RoomId) -> bool {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(identity) => {
                if !identity.joined_rooms.contains(&room_id) {
                    identity.joined_rooms.push(room_id);
                }
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_identity(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserIdentity>, RepositoryError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}
