//! Utilities shared between Tsudoi packages.

pub mod logger;
pub mod time;
