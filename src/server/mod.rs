//! WebSocket server
//!
//! Thin transport plumbing around the hub: TCP accept, HTTP upgrade on a
//! single path, role classification from the query string.

pub mod config;
pub mod listener;
pub mod upgrade;

pub use config::ServerConfig;
pub use listener::HubServer;
