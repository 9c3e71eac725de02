//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! Vec をインメモリ DB として使用し、ID とタイムスタンプはこのストアが採番します。

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tsudoi_shared::time::Clock;

use crate::domain::{
    MessageId, MessageRepository, NewMessage, RepositoryError, RoomId, StoredMessage, Timestamp,
};

pub struct InMemoryMessageRepository {
    clock: Arc<dyn Clock>,
    /// Insertion order
    messages: Mutex<Vec<StoredMessage>>,
    unavailable: AtomicBool,
}

impl InMemoryMessageRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            messages: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `persist` fail with a storage error (or recover)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn persist(&self, message: NewMessage) -> Result<StoredMessage, RepositoryError> {
        if self.unavailable.load(Ordering::Acquire) {
            return Err(RepositoryError::Storage(
                "message store is unavailable".to_string(),
            ));
        }

        let stored = StoredMessage {
            id: MessageId::generate(),
            room_id: message.room_id,
            author: message.author,
            content: message.content,
            created_at: Timestamp::new(self.clock.now()),
        };
        self.messages.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn fetch_before(
        &self,
        room_id: &RoomId,
        before: Timestamp,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        // Walk newest insertion first so equal timestamps keep "later is newer"
        let mut page: Vec<StoredMessage> = messages
            .iter()
            .rev()
            .filter(|m| m.room_id == *room_id && m.created_at < before)
            .cloned()
            .collect();
        page.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        page.truncate(limit);
        Ok(page)
    }
}
