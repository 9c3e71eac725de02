//! Identity providers.

pub mod token;

pub use token::{TokenClaims, TokenIdentityProvider, issue_token};
