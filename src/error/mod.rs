//! Error handling
//!
//! Defines error types and handling for the chat hub.

pub mod types;

pub use types::*;
