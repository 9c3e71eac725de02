//! In-memory storage adapters.

pub mod message;
pub mod user;

pub use message::InMemoryMessageRepository;
pub use user::InMemoryUserDirectory;
