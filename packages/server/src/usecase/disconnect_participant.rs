//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断後にブロードキャスト対象から外れることを保証
//! - 複数回呼ばれても安全であることを確認（ブロードキャスト側の除外と接続終了処理が重なるため）
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断
//! - エッジケース：既に除外済みの参加者の切断

use std::sync::Arc;

use crate::domain::{ClientHandle, RoomId, RoomRegistry};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl DisconnectParticipantUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者切断を実行
    ///
    /// 接続も閉じる。2 回目以降の呼び出しは何もしない。
    ///
    /// # Returns
    ///
    /// * レジストリからエントリを削除した場合は `true`
    pub fn execute(&self, client: &ClientHandle) -> bool {
        let removed = self.registry.leave(client);
        if removed {
            tracing::info!(
                connection_id = %client.connection_id,
                room_id = %client.room_id,
                "User '{}' left community ({} remaining)",
                client.user.username,
                self.count_remaining(&client.room_id)
            );
        }
        removed
    }

    /// ルームに残っている接続数
    pub fn count_remaining(&self, room_id: &RoomId) -> usize {
        self.registry.member_count(room_id)
    }
}
