//! Module `broadcast`
//!
//! Fan-out delivery to live sessions. A frame is serialized once per call and
//! queued on each recipient's writer channel. A failed send on one recipient
//! never prevents delivery to the others and never surfaces to the caller;
//! close handling is the sole mechanism that removes dead sessions.
//!
//! "All" and "all but one" are separate operations so each call site's intent
//! stays explicit.

use log::error;
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::ServerFrame;
use crate::registry::{SessionId, SessionRegistry};

/// Delivers the frame to every live session.
pub fn broadcast_all(registry: &SessionRegistry, frame: &ServerFrame) {
    let Some(raw) = serialize(frame) else { return };
    for session in registry.iter() {
        session.send(Message::text(raw.clone()));
    }
}

/// Delivers the frame to every live session except one.
pub fn broadcast_except(registry: &SessionRegistry, excluded: SessionId, frame: &ServerFrame) {
    let Some(raw) = serialize(frame) else { return };
    for session in registry.iter() {
        if session.id() != excluded {
            session.send(Message::text(raw.clone()));
        }
    }
}

/// Delivers the frame to exactly one session, if it is still registered.
pub fn send_one(registry: &SessionRegistry, id: SessionId, frame: &ServerFrame) {
    let Some(raw) = serialize(frame) else { return };
    if let Some(session) = registry.get(id) {
        session.send(Message::text(raw));
    }
}

fn serialize(frame: &ServerFrame) -> Option<String> {
    match serde_json::to_string(frame) {
        Ok(raw) => Some(raw),
        Err(e) => {
            error!("Failed to serialize outbound frame: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn roster_frame() -> ServerFrame {
        ServerFrame::UserListUpdate {
            users: vec!["Alice".to_string()],
        }
    }

    fn drain(rx: &mut UnboundedReceiver<Message>) -> Vec<ServerFrame> {
        let mut frames = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let Message::Text(text) = msg {
                frames.push(serde_json::from_str(text.as_str()).unwrap());
            }
        }
        frames
    }

    #[test]
    fn broadcast_all_reaches_every_session() {
        let mut registry = SessionRegistry::default();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.register(tx_a);
        registry.register(tx_b);

        broadcast_all(&registry, &roster_frame());

        assert_eq!(drain(&mut rx_a), vec![roster_frame()]);
        assert_eq!(drain(&mut rx_b), vec![roster_frame()]);
    }

    #[test]
    fn broadcast_except_skips_only_the_excluded_session() {
        let mut registry = SessionRegistry::default();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        let a = registry.register(tx_a);
        registry.register(tx_b);
        registry.register(tx_c);

        broadcast_except(&registry, a, &roster_frame());

        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(drain(&mut rx_b), vec![roster_frame()]);
        assert_eq!(drain(&mut rx_c), vec![roster_frame()]);
    }

    #[test]
    fn send_one_targets_a_single_session() {
        let mut registry = SessionRegistry::default();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = registry.register(tx_a);
        registry.register(tx_b);

        send_one(&registry, a, &roster_frame());

        assert_eq!(drain(&mut rx_a), vec![roster_frame()]);
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn send_one_to_unregistered_session_is_a_no_op() {
        let mut registry = SessionRegistry::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(tx);
        registry.unregister(id).unwrap();

        send_one(&registry, id, &roster_frame());
    }

    #[test]
    fn dead_recipient_does_not_abort_the_broadcast() {
        let mut registry = SessionRegistry::default();
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.register(tx_a);
        registry.register(tx_b);

        // Receiver gone but the session not yet unregistered: the close
        // event races the broadcast.
        drop(rx_a);

        broadcast_all(&registry, &roster_frame());

        assert_eq!(drain(&mut rx_b), vec![roster_frame()]);
    }

    #[test]
    fn successive_broadcasts_arrive_in_invocation_order() {
        let mut registry = SessionRegistry::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(tx);

        let first = ServerFrame::SystemMessage {
            content: "first".to_string(),
        };
        let second = ServerFrame::SystemMessage {
            content: "second".to_string(),
        };
        broadcast_all(&registry, &first);
        broadcast_all(&registry, &second);

        assert_eq!(drain(&mut rx), vec![first, second]);
    }
}
