//! Infrastructure layer.
//!
//! Concrete adapters for the ports declared by the domain layer.

pub mod dto;
pub mod identity;
pub mod message_pusher;
pub mod registry;
pub mod repository;
