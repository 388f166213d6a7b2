//! Broadcast message type

use crate::connection::Payload;
use crate::session::SessionId;

/// A message on its way through the router
///
/// Carries no ordering metadata: its position in the router's input stream
/// is its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    /// Session whose reader received the message
    pub origin: SessionId,
    /// Message contents, shared by every recipient
    pub payload: Payload,
}

impl BroadcastMessage {
    /// Create a broadcast message
    pub fn new(origin: SessionId, payload: Payload) -> Self {
        Self { origin, payload }
    }
}
