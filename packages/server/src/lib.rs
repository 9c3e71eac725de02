//! Real-time community messaging core.
//!
//! Authenticated users join community rooms over WebSocket. Every message is
//! persisted before it is broadcast to the live members of its room, and
//! history is served in pages of author-grouped runs.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
