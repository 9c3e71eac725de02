//! Server state shared by every handler.

use std::{sync::Arc, time::Duration};

use crate::{
    domain::RoomRegistry,
    usecase::{
        AuthorizeConnectionUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetMessageHistoryUseCase, SendMessageUseCase,
    },
};

/// Per-connection tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Frames that may wait in a client's outbound queue
    pub outbound_buffer: usize,
    /// Upper bound for a single socket write
    pub write_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            outbound_buffer: 64,
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// AuthorizeConnectionUseCase（接続の認可）
    pub authorize_connection_usecase: Arc<AuthorizeConnectionUseCase>,
    /// ConnectParticipantUseCase（参加者接続）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetMessageHistoryUseCase（メッセージ履歴取得）
    pub get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    /// RoomRegistry（シャットダウン時の一括切断とデバッグ用）
    pub registry: Arc<dyn RoomRegistry>,
    pub connection: ConnectionSettings,
}
