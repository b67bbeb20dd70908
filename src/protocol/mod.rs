//! Chat protocol implementation
//!
//! Handles frame definitions, parsing, and validation for the hub's
//! JSON-over-WebSocket protocol.

pub mod frames;
pub mod parser;

pub use frames::{ChatMessage, ClientFrame, ServerFrame};
pub use parser::{parse_frame, validate_content};
