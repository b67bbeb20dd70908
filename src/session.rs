//! Module `session`
//!
//! Owns the lifecycle of a single connection from WebSocket accept through
//! identity assignment and message handling to teardown. This is the only
//! module that mutates the session registry and the history buffer; every
//! handler runs to completion while holding the shared locks, so no two
//! mutations ever interleave mid-update.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::broadcast;
use crate::config::HubConfig;
use crate::error::ProtocolError;
use crate::history::HistoryBuffer;
use crate::protocol::{self, ChatMessage, ClientFrame, ServerFrame};
use crate::registry::{SessionId, SessionRegistry};

/// Runs one connection's session: registers it, replays history, processes
/// inbound frames in arrival order, and tears the session down on close.
///
/// The socket is split into a reader half driven here and a writer half owned
/// by a spawned task fed through an unbounded channel. Cloning that channel's
/// sender into the registry is what lets broadcasts from other sessions reach
/// this connection, while the single writer task keeps per-recipient delivery
/// in invocation order.
pub async fn run_session(
    socket: WebSocketStream<TcpStream>,
    peer: SocketAddr,
    registry: Arc<Mutex<SessionRegistry>>,
    history: Arc<Mutex<HistoryBuffer>>,
    config: Arc<HubConfig>,
) {
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();
    let writer = tokio::spawn(writer_task(ws_sink, rx));

    // On accept: register, replay history to this connection only, then
    // announce the grown roster to everyone including the new session.
    let session_id = {
        let mut reg = registry.lock().await;
        let history = history.lock().await;

        let id = reg.register(tx.clone());
        if !history.is_empty() {
            broadcast::send_one(
                &reg,
                id,
                &ServerFrame::History {
                    messages: history.snapshot(),
                },
            );
        }
        broadcast::broadcast_all(&reg, &roster_frame(&reg));
        id
    };

    info!("Client {} connected as session {}", peer, session_id);

    loop {
        match ws_stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let mut reg = registry.lock().await;
                let mut history = history.lock().await;
                dispatch_frame(&mut reg, &mut history, session_id, text.as_str(), &config);
            }
            Some(Ok(Message::Binary(_))) => {
                // Not part of the protocol; reject to the sender only.
                let reg = registry.lock().await;
                send_error(&reg, session_id, &ProtocolError::InvalidPayload);
            }
            Some(Ok(Message::Ping(payload))) => {
                let _ = tx.send(Message::Pong(payload));
            }
            Some(Ok(Message::Pong(_)) | Ok(Message::Frame(_))) => {}
            Some(Ok(Message::Close(_))) => {
                info!("Session {} closed by client", session_id);
                break;
            }
            Some(Err(e)) => {
                // Transport fault: report, attempt a best-effort notice, then
                // fall through to the regular close handling below.
                warn!("WebSocket error on session {}: {}", session_id, e);
                if let Ok(raw) = serde_json::to_string(&ServerFrame::Error {
                    message: "An internal server error occurred.".to_string(),
                }) {
                    let _ = tx.send(Message::text(raw));
                }
                break;
            }
            None => {
                info!("Session {} stream ended", session_id);
                break;
            }
        }
    }

    // On close: unregister (tolerating a racing removal), then announce the
    // departure and the shrunk roster to everyone remaining.
    {
        let mut reg = registry.lock().await;
        if let Ok(removed) = reg.unregister(session_id) {
            broadcast::broadcast_all(
                &reg,
                &ServerFrame::SystemMessage {
                    content: format!("{} has left the chat.", removed.label()),
                },
            );
            broadcast::broadcast_all(&reg, &roster_frame(&reg));
        }
    }

    info!("Client {} disconnected", peer);
    writer.abort();
}

/// Writer task: forwards queued frames to the WebSocket sink. A failed send
/// means the connection is broken; the reader loop observes that on its side.
async fn writer_task(
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if sink.send(msg).await.is_err() {
            break;
        }
    }
}

/// Parses one inbound frame and dispatches it to its handler. Parse failures
/// cost the sender an `error` frame and nothing else.
pub(crate) fn dispatch_frame(
    registry: &mut SessionRegistry,
    history: &mut HistoryBuffer,
    id: SessionId,
    raw: &str,
    config: &HubConfig,
) {
    match protocol::parse_frame(raw) {
        Ok(ClientFrame::SetUsername { username }) => {
            handle_set_username(registry, id, &username, config);
        }
        Ok(ClientFrame::ChatMessage { content }) => {
            handle_chat_message(registry, history, id, &content, config);
        }
        Err(e) => {
            warn!("Rejected frame from session {}: {}", id, e);
            send_error(registry, id, &e);
        }
    }
}

/// Handles a display-name request: confirm to the requester, announce the
/// rename, then push the updated roster. A rejected name costs the requester
/// an `error` frame and changes nothing.
pub(crate) fn handle_set_username(
    registry: &mut SessionRegistry,
    id: SessionId,
    requested: &str,
    config: &HubConfig,
) {
    match registry.set_display_name(id, requested, config.max_username_length) {
        Ok(change) => {
            info!("Session {} set username to {}", id, change.effective);
            broadcast::send_one(
                registry,
                id,
                &ServerFrame::UsernameConfirmed {
                    username: change.effective.clone(),
                },
            );
            broadcast::broadcast_all(
                registry,
                &ServerFrame::SystemMessage {
                    content: format!("{} is now {}.", change.previous_label, change.effective),
                },
            );
            broadcast::broadcast_all(registry, &roster_frame(registry));
        }
        Err(e) => {
            warn!("Rejected username from session {}: {}", id, e);
            broadcast::send_one(
                registry,
                id,
                &ServerFrame::Error {
                    message: e.to_string(),
                },
            );
        }
    }
}

/// Handles chat text: validate, snapshot the sender's current label into a
/// timestamped message, append it to history, and broadcast to everyone
/// including the sender, whose UI renders from the authoritative server copy.
pub(crate) fn handle_chat_message(
    registry: &SessionRegistry,
    history: &mut HistoryBuffer,
    id: SessionId,
    content: &str,
    config: &HubConfig,
) {
    let trimmed = match protocol::validate_content(content, config.max_message_length) {
        Ok(trimmed) => trimmed,
        Err(e) => {
            warn!("Rejected chat message from session {}: {}", id, e);
            send_error(registry, id, &e);
            return;
        }
    };

    // The sender can vanish between frame receipt and dispatch on a racing
    // close; the message is then dropped with the session.
    let Some(sender) = registry.get(id) else {
        return;
    };

    let message = ChatMessage::new(sender.label(), trimmed.to_string());
    history.append(message.clone());
    broadcast::broadcast_all(registry, &ServerFrame::Chat { message });
}

fn send_error(registry: &SessionRegistry, id: SessionId, error: &ProtocolError) {
    broadcast::send_one(
        registry,
        id,
        &ServerFrame::Error {
            message: error.to_string(),
        },
    );
}

fn roster_frame(registry: &SessionRegistry) -> ServerFrame {
    ServerFrame::UserListUpdate {
        users: registry.current_labels(),
    }
}
