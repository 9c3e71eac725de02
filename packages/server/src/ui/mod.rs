//! HTTP / WebSocket server.

mod handler;
mod server;
mod signal;
pub mod state; // UseCase 層からアクセスするため public

pub use server::{Server, ServerConfig};
pub use signal::shutdown_signal;
pub use state::{AppState, ConnectionSettings};
