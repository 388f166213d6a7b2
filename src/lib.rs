//! Real-time WebSocket broadcast hub
//!
//! Clients hold persistent WebSocket connections; every message any client
//! sends is fanned out to the currently connected clients selected by a
//! [`FanoutPredicate`](router::FanoutPredicate).
//!
//! # Architecture
//!
//! ```text
//!   HubServer (TCP accept + upgrade on /echo?role=...)
//!        │
//!        ▼
//!   Hub::connect ──► SessionHandle ──► Registry
//!        │
//!        ├── reader loop ──► RouterInput ──► Router ──► try_enqueue
//!        │                                               │
//!        └── writer pump ◄── outbound buffer (256) ◄─────┘
//! ```
//!
//! - One reader task and one writer task per session, plus one router task.
//! - The router handles messages strictly in arrival order.
//! - A full outbound buffer drops the message for that recipient only; the
//!   router never waits on a slow client.
//! - Transport errors tear down exactly the session they happened on.
//!
//! # Example
//!
//! ```no_run
//! use wshub_rs::{HubConfig, HubServer, ServerConfig};
//!
//! # async fn example() -> wshub_rs::error::Result<()> {
//! let server = HubServer::with_hub_config(ServerConfig::default(), HubConfig::default());
//! server.run().await
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod hub;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod stats;

pub use connection::{Connection, Payload, PayloadKind};
pub use error::{Error, Result};
pub use hub::{Hub, HubConfig, SessionTask};
pub use registry::Registry;
pub use router::{BroadcastMessage, FanoutPredicate, Router};
pub use server::{HubServer, ServerConfig};
pub use session::{Role, SessionId, SessionPhase};
