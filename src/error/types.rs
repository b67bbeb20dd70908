//! Error types
//!
//! Defines domain-specific error types for each module of the chat hub.

use std::fmt;
use std::io;

use crate::registry::SessionId;

/// Protocol module errors.
///
/// All variants are user-facing: the `Display` text is what the offending
/// connection receives in an `error` frame. No variant is fatal to the
/// connection, let alone the hub.
#[derive(Debug, PartialEq)]
pub enum ProtocolError {
    /// Frame was not parseable as a JSON object with the expected fields.
    InvalidPayload,
    /// Well-formed frame carrying an unrecognized `type` value.
    UnknownType(String),
    /// Chat content empty after trimming.
    EmptyContent,
    /// Chat content longer than the configured bound.
    OversizedContent { limit: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidPayload => write!(f, "Invalid JSON format."),
            ProtocolError::UnknownType(kind) => write!(f, "Unknown message type: {}.", kind),
            ProtocolError::EmptyContent => write!(f, "Chat message content cannot be empty."),
            ProtocolError::OversizedContent { limit } => {
                write!(f, "Chat message exceeds {} characters.", limit)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Registry module errors
#[derive(Debug, PartialEq)]
pub enum RegistryError {
    /// Requested display name empty after trimming.
    InvalidName,
    /// No session registered under this ID. Close events can race, so callers
    /// tolerate this as a no-op.
    NotFound(SessionId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidName => write!(f, "Invalid username provided."),
            RegistryError::NotFound(id) => write!(f, "Session not found: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}

/// General hub error that encompasses all error types
#[derive(Debug)]
pub enum HubError {
    Protocol(ProtocolError),
    Registry(RegistryError),
    Io(io::Error),
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubError::Protocol(e) => write!(f, "Protocol error: {}", e),
            HubError::Registry(e) => write!(f, "Registry error: {}", e),
            HubError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for HubError {}

impl From<ProtocolError> for HubError {
    fn from(error: ProtocolError) -> Self {
        HubError::Protocol(error)
    }
}

impl From<RegistryError> for HubError {
    fn from(error: RegistryError) -> Self {
        HubError::Registry(error)
    }
}

impl From<io::Error> for HubError {
    fn from(error: io::Error) -> Self {
        HubError::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_is_the_user_facing_error_message() {
        assert_eq!(ProtocolError::InvalidPayload.to_string(), "Invalid JSON format.");
        assert_eq!(
            ProtocolError::EmptyContent.to_string(),
            "Chat message content cannot be empty."
        );
        assert_eq!(
            ProtocolError::OversizedContent { limit: 2000 }.to_string(),
            "Chat message exceeds 2000 characters."
        );
        assert_eq!(RegistryError::InvalidName.to_string(), "Invalid username provided.");
    }

    #[test]
    fn umbrella_wraps_module_errors() {
        let e: HubError = ProtocolError::InvalidPayload.into();
        assert_eq!(e.to_string(), "Protocol error: Invalid JSON format.");

        let e: HubError = RegistryError::InvalidName.into();
        assert_eq!(e.to_string(), "Registry error: Invalid username provided.");

        let e: HubError = io::Error::other("boom").into();
        assert_eq!(e.to_string(), "I/O error: boom");
    }
}
