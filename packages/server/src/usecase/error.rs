//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{AuthError, RepositoryError, ValueObjectError};

/// 接続（およびユーザー認可）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: role is not allowed to access communities")]
    Forbidden,

    #[error("community not found or user is not a member")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ConnectError {
    /// クライアントに返すステータスコード
    pub fn status_code(&self) -> u16 {
        match self {
            ConnectError::BadRequest(_) => 400,
            ConnectError::Unauthenticated(_) => 401,
            ConnectError::Forbidden => 403,
            ConnectError::NotFound => 404,
            ConnectError::Internal(_) => 500,
        }
    }
}

impl From<AuthError> for ConnectError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Directory(reason) => ConnectError::Internal(reason),
            other => ConnectError::Unauthenticated(other.to_string()),
        }
    }
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("invalid message content: {0}")]
    InvalidContent(#[from] ValueObjectError),

    #[error("failed to persist message: {0}")]
    Persistence(RepositoryError),
}

impl SendMessageError {
    pub fn status_code(&self) -> u16 {
        match self {
            SendMessageError::InvalidContent(_) => 400,
            SendMessageError::Persistence(_) => 500,
        }
    }
}

/// メッセージ履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("failed to fetch messages: {0}")]
    Storage(#[from] RepositoryError),
}

impl HistoryError {
    pub fn status_code(&self) -> u16 {
        500
    }
}
