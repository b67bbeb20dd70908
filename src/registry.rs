//! Module `registry`
//!
//! Tracks the set of currently-open sessions and their chat identity. The
//! registry is the hub's authoritative roster: every entry's connection is
//! live, and entries are removed synchronously with the close event. All
//! mutation goes through the session lifecycle controller, which serializes
//! access behind the shared registry lock.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::error::RegistryError;

/// Handle used to queue outbound frames for one connection's writer task.
pub type OutboundSender = mpsc::UnboundedSender<Message>;

/// Number of ID characters used for the derived guest label.
const GUEST_LABEL_LEN: usize = 8;

/// Opaque unique session token, assigned at accept time, immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derived display name for a session with no chosen name.
    ///
    /// Deterministic for the life of the session; the v4 ID makes prefix
    /// collisions negligible at realistic roster sizes.
    pub fn guest_label(&self) -> String {
        let hex = self.0.simple().to_string();
        format!("Guest-{}", &hex[..GUEST_LABEL_LEN])
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// One active connection's identity and outbound channel.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    username: Option<String>,
    sender: OutboundSender,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Display name if chosen, derived guest label otherwise.
    pub fn label(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| self.id.guest_label())
    }

    /// Queues a message for this session's writer task. A send failure means
    /// the connection is already tearing down and is deliberately ignored;
    /// close handling is the sole mechanism that removes dead sessions.
    pub fn send(&self, message: Message) {
        let _ = self.sender.send(message);
    }
}

// The sender channel has no equality; compare identity fields only. Needed
// solely for test assertions on `Result<Session, RegistryError>`.
#[cfg(test)]
impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.username == other.username
    }
}

/// Outcome of a successful display-name change, for notification text.
#[derive(Debug, PartialEq)]
pub struct NameChange {
    /// Label the session carried before the change (old name or guest label).
    pub previous_label: String,
    /// Effective stored name, possibly truncated.
    pub effective: String,
}

/// Live mapping of session IDs to sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
}

impl SessionRegistry {
    /// Creates a session with a fresh unique ID and no display name.
    /// Never fails; capacity is bounded only by the host's connection limit.
    pub fn register(&mut self, sender: OutboundSender) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(
            id,
            Session {
                id,
                username: None,
                sender,
            },
        );
        id
    }

    /// Stores a display name for the session, trimming and truncating to
    /// `max_length` characters. Returns the effective name and the previous
    /// label for use in notification text.
    pub fn set_display_name(
        &mut self,
        id: SessionId,
        requested: &str,
        max_length: usize,
    ) -> Result<NameChange, RegistryError> {
        let trimmed = requested.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::InvalidName);
        }

        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;

        let previous_label = session.label();
        let effective: String = trimmed.chars().take(max_length).collect();
        session.username = Some(effective.clone());

        Ok(NameChange {
            previous_label,
            effective,
        })
    }

    /// Removes the session, returning it for departure notices.
    pub fn unregister(&mut self, id: SessionId) -> Result<Session, RegistryError> {
        self.sessions.remove(&id).ok_or(RegistryError::NotFound(id))
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Display labels of every live session. Order is implementation-defined
    /// but consistent within a single call.
    pub fn current_labels(&self) -> Vec<String> {
        self.sessions.values().map(Session::label).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
