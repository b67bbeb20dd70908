//! Configuration management for the chat hub
//!
//! Loads settings from an optional `config.toml` with environment overrides
//! (prefix `CHAT_HUB`). Every field has a default so the server runs with no
//! config file at all.

use config::{Config, Environment, File};
use serde::Deserialize;

/// Hub configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HubConfig {
    /// IP address to bind the WebSocket listener
    pub bind_address: String,

    /// Listener port; 0 asks the OS for an ephemeral port (used by tests)
    pub port: u16,

    /// Maximum chat messages kept for replay to new connections
    pub history_capacity: usize,

    /// Maximum chat message length in characters; longer messages are rejected
    pub max_message_length: usize,

    /// Maximum display name length in characters; longer names are truncated
    pub max_username_length: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            history_capacity: 50,
            max_message_length: 2000,
            max_username_length: 20,
        }
    }
}

impl HubConfig {
    /// Load configuration from config.toml (if present) with environment
    /// overrides, falling back to defaults for anything unset.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CHAT_HUB"))
            .build()?;

        let config: HubConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.history_capacity == 0 {
            return Err(config::ConfigError::Message(
                "history_capacity must be greater than 0".into(),
            ));
        }

        if self.max_message_length == 0 {
            return Err(config::ConfigError::Message(
                "max_message_length must be greater than 0".into(),
            ));
        }

        if self.max_username_length == 0 {
            return Err(config::ConfigError::Message(
                "max_username_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
