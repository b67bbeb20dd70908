//! Server core functionality
//!
//! Binds the listener and runs the accept loop, performing the WebSocket
//! handshake and spawning a session task per connection. The registry and
//! history buffer are the only shared mutable state; each handler locks them
//! for the duration of one event, so mutations never interleave.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::accept_async;

use crate::config::HubConfig;
use crate::history::HistoryBuffer;
use crate::registry::SessionRegistry;
use crate::session;

pub struct Server {
    registry: Arc<Mutex<SessionRegistry>>,
    history: Arc<Mutex<HistoryBuffer>>,
    listener: TcpListener,
    config: Arc<HubConfig>,
}

impl Server {
    pub async fn new(config: HubConfig) -> Self {
        let addr = config.socket_addr();

        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                panic!("Server startup failed on socket {}: {}", addr, e);
            }
        };

        Self {
            registry: Arc::new(Mutex::new(SessionRegistry::default())),
            history: Arc::new(Mutex::new(HistoryBuffer::new(config.history_capacity))),
            listener,
            config: Arc::new(config),
        }
    }

    /// Address the listener actually bound to. With port 0 in the config this
    /// is the OS-assigned ephemeral port.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(&self) {
        info!("Starting chat hub on {}", self.config.socket_addr());

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&self.registry);
                    let history = Arc::clone(&self.history);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so the accept loop doesn't block
                    tokio::spawn(async move {
                        handle_new_connection(stream, addr, registry, history, config).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Performs the WebSocket handshake and hands the connection to its session.
async fn handle_new_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<Mutex<SessionRegistry>>,
    history: Arc<Mutex<HistoryBuffer>>,
    config: Arc<HubConfig>,
) {
    match accept_async(stream).await {
        Ok(socket) => {
            session::run_session(socket, addr, registry, history, config).await;
        }
        Err(e) => {
            warn!("WebSocket handshake failed for {}: {}", addr, e);
        }
    }
}
