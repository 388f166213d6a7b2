//! In-process connection adapter
//!
//! A [`ChannelConnection`] is the hub-side end of a pair of bounded mpsc
//! channels; the matching [`ChannelPeer`] plays the remote client. Writes
//! wait for room in the peer's inbox, so a peer that stops reading behaves
//! exactly like a slow network client.

use tokio::sync::mpsc;

use super::{Connection, FrameReader, FrameWriter, Payload};
use crate::error::{Error, Result};

/// What the peer observes from the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// A delivered message
    Message(Payload),
    /// The hub's close notification
    Close,
}

/// Hub-side end of an in-process connection
pub struct ChannelConnection {
    inbound: mpsc::Receiver<Payload>,
    outbound: mpsc::Sender<PeerEvent>,
}

impl ChannelConnection {
    /// Create a connected pair; `capacity` bounds each direction
    pub fn pair(capacity: usize) -> (ChannelConnection, ChannelPeer) {
        let (to_hub, inbound) = mpsc::channel(capacity);
        let (outbound, from_hub) = mpsc::channel(capacity);

        (
            ChannelConnection { inbound, outbound },
            ChannelPeer {
                tx: Some(to_hub),
                rx: from_hub,
            },
        )
    }
}

impl Connection for ChannelConnection {
    type Reader = ChannelReader;
    type Writer = ChannelWriter;

    fn split(self) -> (Self::Reader, Self::Writer) {
        (
            ChannelReader { rx: self.inbound },
            ChannelWriter {
                tx: Some(self.outbound),
            },
        )
    }
}

/// Receiving half of a [`ChannelConnection`]
pub struct ChannelReader {
    rx: mpsc::Receiver<Payload>,
}

impl FrameReader for ChannelReader {
    async fn recv(&mut self) -> Option<Result<Payload>> {
        self.rx.recv().await.map(Ok)
    }
}

/// Sending half of a [`ChannelConnection`]
pub struct ChannelWriter {
    tx: Option<mpsc::Sender<PeerEvent>>,
}

impl FrameWriter for ChannelWriter {
    async fn send(&mut self, payload: Payload) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::ConnectionClosed)?;
        tx.send(PeerEvent::Message(payload))
            .await
            .map_err(|_| Error::ConnectionClosed)
    }

    async fn close(&mut self) -> Result<()> {
        match self.tx.take() {
            Some(tx) => tx
                .send(PeerEvent::Close)
                .await
                .map_err(|_| Error::ConnectionClosed),
            None => Ok(()),
        }
    }
}

/// Remote end of an in-process connection
pub struct ChannelPeer {
    tx: Option<mpsc::Sender<Payload>>,
    rx: mpsc::Receiver<PeerEvent>,
}

impl ChannelPeer {
    /// Send a message to the hub
    pub async fn send(&self, payload: Payload) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(Error::ConnectionClosed)?;
        tx.send(payload).await.map_err(|_| Error::ConnectionClosed)
    }

    /// Wait for the next event from the hub; `None` once the hub side is gone
    pub async fn recv(&mut self) -> Option<PeerEvent> {
        self.rx.recv().await
    }

    /// Take an already-delivered event without waiting
    pub fn try_recv(&mut self) -> Option<PeerEvent> {
        self.rx.try_recv().ok()
    }

    /// Close the peer's sending direction; the hub sees a graceful close
    pub fn disconnect(&mut self) {
        self.tx = None;
    }
}
