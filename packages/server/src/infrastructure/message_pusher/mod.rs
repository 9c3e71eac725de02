//! Fan-out implementations.

pub mod websocket;

pub use websocket::WebSocketBroadcaster;
