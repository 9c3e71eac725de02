//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → ブロードキャストの順序
//!
//! ### なぜこのテストが必要か
//! - 永続化に成功したメッセージだけがブロードキャストされることを保証
//! - 不正な内容のメッセージが永続化されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージの永続化とブロードキャスト
//! - 異常系：永続化失敗（ブロードキャストしない）、空メッセージ

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, MessageBroadcaster, MessageContent, MessageRepository, NewMessage, RoomId,
    StoredMessage, UserProfile,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（メッセージ永続化の抽象化）
    repository: Arc<dyn MessageRepository>,
    /// Broadcaster（ルーム内配信の抽象化）
    broadcaster: Arc<dyn MessageBroadcaster>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        broadcaster: Arc<dyn MessageBroadcaster>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 送信先のルーム
    /// * `author` - 送信者のプロフィール
    /// * `content` - クライアントから受信したテキスト
    ///
    /// # Returns
    ///
    /// * `Ok((StoredMessage, BroadcastReport))` - 永続化されたメッセージと配信結果
    /// * `Err(SendMessageError)` - 内容が不正、または永続化に失敗（この場合は配信しない）
    pub async fn execute(
        &self,
        room_id: RoomId,
        author: UserProfile,
        content: String,
    ) -> Result<(StoredMessage, BroadcastReport), SendMessageError> {
        // 1. 内容の検証
        let content = MessageContent::new(content)?;

        // 2. 永続化（ID とタイムスタンプはストアが採番）
        let stored = self
            .repository
            .persist(NewMessage::new(room_id, author, content))
            .await
            .map_err(|e| {
                tracing::error!(room_id = %room_id, "Failed to persist message: {}", e);
                SendMessageError::Persistence(e)
            })?;

        // 3. ブロードキャスト
        let report = self.broadcaster.broadcast(&stored);

        Ok((stored, report))
    }
}
