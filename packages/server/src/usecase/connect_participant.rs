//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 認可済みユーザーのルーム参加（ClientHandle 生成とレジストリ登録）
//!
//! ### なぜこのテストが必要か
//! - 参加直後からブロードキャスト対象になることを保証
//! - 送信キューの容量設定が反映されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加
//! - エッジケース：同じユーザーの複数接続（別々のエントリとして登録される）

use std::sync::Arc;

use crate::domain::{ClientHandle, OutboundReceiver, RoomId, RoomRegistry, UserIdentity};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// RoomRegistry（接続中クライアントの管理）
    registry: Arc<dyn RoomRegistry>,
    /// クライアントごとの送信キュー容量
    outbound_buffer: usize,
}

impl ConnectParticipantUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, outbound_buffer: usize) -> Self {
        Self {
            registry,
            outbound_buffer,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Returns
    ///
    /// * 登録済みの `ClientHandle` と、writer タスクが読み出す送信キューの受信側
    pub fn execute(
        &self,
        identity: &UserIdentity,
        room_id: RoomId,
    ) -> (Arc<ClientHandle>, OutboundReceiver) {
        let (handle, outbound) =
            ClientHandle::new(identity.profile.clone(), room_id, self.outbound_buffer);
        let handle = Arc::new(handle);
        self.registry.join(handle.clone());

        tracing::info!(
            connection_id = %handle.connection_id,
            user_id = %identity.user_id(),
            room_id = %room_id,
            "User '{}' joined community",
            identity.profile.username
        );
        (handle, outbound)
    }
}
