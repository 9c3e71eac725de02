//! WebSocket broadcaster.
//!
//! ## 責務
//!
//! - 永続化済みメッセージを 1 度だけ JSON にシリアライズする
//! - ルームの全クライアント（送信者を含む）のキューへ投入する
//! - 投入に失敗したクライアントをルームから除外する
//!
//! ## 設計ノート
//!
//! ソケットへの書き込みは各接続の writer タスクが行います。
//! ここではレジストリのスナップショットに対して `try_push` するだけなので、
//! 遅いクライアントが他のクライアントへの配信を待たせることはありません。

use std::sync::Arc;

use crate::{
    domain::{BroadcastReport, MessageBroadcaster, MessageGroupId, RoomRegistry, StoredMessage},
    infrastructure::dto::websocket::MessageEventDto,
};

pub struct WebSocketBroadcaster {
    registry: Arc<dyn RoomRegistry>,
}

impl WebSocketBroadcaster {
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }
}

impl MessageBroadcaster for WebSocketBroadcaster {
    fn broadcast(&self, message: &StoredMessage) -> BroadcastReport {
        let event = MessageEventDto::from_stored(message, MessageGroupId::generate());
        let frame = match serde_json::to_string(&event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(message_id = %message.id, "Failed to serialize message event: {}", e);
                return BroadcastReport::default();
            }
        };

        let mut report = BroadcastReport::default();
        for client in self.registry.snapshot(&message.room_id) {
            match client.try_push(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %client.connection_id,
                        room_id = %message.room_id,
                        "Dropping client after failed write: {}",
                        e
                    );
                    self.registry.leave(&client);
                    report.pruned += 1;
                }
            }
        }

        tracing::debug!(
            room_id = %message.room_id,
            delivered = report.delivered,
            pruned = report.pruned,
            "Broadcast message '{}'",
            message.id
        );
        report
    }
}
