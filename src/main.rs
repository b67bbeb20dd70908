//! Chat Hub Server - Entry Point
//!
//! A real-time broadcast chat hub: clients connect over WebSocket, optionally
//! pick a display name, and exchange messages fanned out to every participant.

use log::{error, info};

use chat_hub_server::Server;
use chat_hub_server::config::HubConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match HubConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Launching chat hub...");

    let server = Server::new(config).await;
    server.start().await;
}
