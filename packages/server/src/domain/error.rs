//! Domain errors.

use thiserror::Error;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("invalid {kind}: '{value}'")]
    InvalidId { kind: &'static str, value: String },

    #[error("message content must not be empty")]
    EmptyMessageContent,

    #[error("message content is too long ({actual} > {max} characters)")]
    MessageContentTooLong { max: usize, actual: usize },

    #[error("unknown user color: '{0}'")]
    UnknownColor(String),

    #[error("unknown role: '{0}'")]
    UnknownRole(String),
}

/// Errors raised by storage adapters (messages, users)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("corrupted record: {0}")]
    Corrupted(String),
}

/// Errors raised while resolving a bearer credential to an identity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credential is missing")]
    MissingCredential,

    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("user not found")]
    UnknownUser,

    #[error("token role does not match the user record")]
    RoleMismatch,

    #[error("user directory unavailable: {0}")]
    Directory(String),
}

/// Errors raised when queueing a frame for a client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("outbound queue is full")]
    QueueFull,

    #[error("connection is closed")]
    Closed,
}

/// Invalid connection state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid connection state transition: {from:?} -> {to:?}")]
pub struct ConnectionStateError {
    pub from: super::ConnectionState,
    pub to: super::ConnectionState,
}
