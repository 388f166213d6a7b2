//! Connection abstraction
//!
//! A connection is one bidirectional message-stream endpoint. The hub never
//! touches it as a whole: on connect it is split into a [`FrameReader`] owned
//! by the session's reader loop and a [`FrameWriter`] owned by its writer
//! pump, so neither direction can block the other.
//!
//! Two adapters ship with the crate:
//! - [`WsConnection`]: a `tokio_tungstenite` WebSocket stream
//! - [`ChannelConnection`]: an in-process pair, useful for tests and embedding

use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

pub mod channel;
pub mod websocket;

pub use channel::{ChannelConnection, ChannelPeer, PeerEvent};
pub use websocket::WsConnection;

/// Kind of a wire message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// UTF-8 text frame
    Text,
    /// Binary frame
    Binary,
}

/// One opaque wire message
///
/// Cheap to clone: the data is reference counted, so every recipient of a
/// broadcast shares the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Frame kind, preserved end to end
    pub kind: PayloadKind,
    /// Frame contents
    pub data: Bytes,
}

impl Payload {
    /// Create a text payload
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            kind: PayloadKind::Text,
            data: Bytes::from(data.into()),
        }
    }

    /// Create a binary payload
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self {
            kind: PayloadKind::Binary,
            data: data.into(),
        }
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Receiving half of a connection
pub trait FrameReader: Send + 'static {
    /// Wait for the next message.
    ///
    /// Returns `None` once the peer has closed the connection gracefully.
    /// Control frames are handled by the transport and never surface here.
    fn recv(&mut self) -> impl Future<Output = Option<Result<Payload>>> + Send;
}

/// Sending half of a connection
pub trait FrameWriter: Send + 'static {
    /// Write one message, waiting until the transport accepts it
    fn send(&mut self, payload: Payload) -> impl Future<Output = Result<()>> + Send;

    /// Send a close notification (if the transport has one) and shut the
    /// write side down
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;
}

/// A bidirectional message-stream endpoint
pub trait Connection: Send + 'static {
    /// Receiving half
    type Reader: FrameReader;
    /// Sending half
    type Writer: FrameWriter;

    /// Split into independently owned halves
    fn split(self) -> (Self::Reader, Self::Writer);
}
