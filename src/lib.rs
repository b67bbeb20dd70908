pub mod broadcast;
pub mod config;
pub mod error;
pub mod history;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;

pub use server::Server;
