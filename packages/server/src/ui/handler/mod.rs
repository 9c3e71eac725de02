//! Request handlers.

mod http;
mod websocket;

pub use http::{debug_room_presence, get_message_history, health_check};
pub use websocket::websocket_handler;
