//! Wire frame definitions
//!
//! One JSON object per WebSocket text frame, discriminated by a `type` field.
//! Field and variant spellings match the protocol the browser client speaks,
//! hence the camelCase renames.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Format of the server-assigned, human-readable message timestamp.
const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// A chat message as stored in history and delivered to clients.
///
/// The sender label is snapshotted at send time; renaming or disconnecting a
/// user never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    /// Build a message stamped with the current local time.
    pub fn new(sender: String, content: String) -> Self {
        Self {
            sender,
            content,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Frames a client may send to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    /// Request a display name.
    SetUsername { username: String },
    /// Send chat text.
    ChatMessage { content: String },
}

/// Frames the hub sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerFrame {
    /// Name accepted; echoes the effective (possibly truncated) value.
    UsernameConfirmed { username: String },
    /// A chat message for display.
    Chat {
        #[serde(flatten)]
        message: ChatMessage,
    },
    /// History replay, sent once to a newly joined connection.
    History { messages: Vec<ChatMessage> },
    /// Join/leave/rename notices.
    SystemMessage { content: String },
    /// Full roster snapshot.
    UserListUpdate { users: Vec<String> },
    /// Rejected request or fault, sent to the originating connection only.
    Error { message: String },
}
