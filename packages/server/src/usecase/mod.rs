//! UseCase 層
//!
//! ドメインのポートを組み合わせて、接続の認可・参加・切断、メッセージ送信、
//! 履歴取得を実装します。

pub mod authorize_connection;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_message_history;
pub mod send_message;

pub use authorize_connection::{AuthorizeConnectionUseCase, ConnectionRequest, parse_room_id};
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, HistoryError, SendMessageError};
pub use get_message_history::{DEFAULT_PAGE_SIZE, GetMessageHistoryUseCase};
pub use send_message::SendMessageUseCase;
