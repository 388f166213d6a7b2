//! WebSocket connection adapter
//!
//! Wraps a `tokio_tungstenite` stream. Ping/pong handling stays inside
//! tungstenite; only text and binary frames reach the hub.

use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::WebSocketStream;

use super::{Connection, FrameReader, FrameWriter, Payload, PayloadKind};
use crate::error::{Error, Result};

/// A WebSocket endpoint over any async byte stream
pub struct WsConnection<S> {
    stream: WebSocketStream<S>,
}

impl<S> WsConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Wrap an already-upgraded WebSocket stream
    pub fn new(stream: WebSocketStream<S>) -> Self {
        Self { stream }
    }
}

impl<S> Connection for WsConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Reader = WsReader<S>;
    type Writer = WsWriter<S>;

    fn split(self) -> (Self::Reader, Self::Writer) {
        let (sink, stream) = self.stream.split();
        (
            WsReader { inner: stream },
            WsWriter {
                inner: sink,
                closed: false,
            },
        )
    }
}

/// Receiving half of a [`WsConnection`]
pub struct WsReader<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

impl<S> FrameReader for WsReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn recv(&mut self) -> Option<Result<Payload>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(Ok(Payload {
                        kind: PayloadKind::Text,
                        data: Bytes::from(text),
                    }));
                }
                Ok(Message::Binary(data)) => return Some(Ok(Payload::binary(data))),
                Ok(Message::Close(frame)) => {
                    tracing::trace!(close = ?frame, "Peer sent close frame");
                    return None;
                }
                // Ping/pong replies are queued by tungstenite itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Sending half of a [`WsConnection`]
pub struct WsWriter<S> {
    inner: SplitSink<WebSocketStream<S>, Message>,
    closed: bool,
}

impl<S> FrameWriter for WsWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send(&mut self, payload: Payload) -> Result<()> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }

        let message = match payload.kind {
            // Text that isn't valid UTF-8 goes out as binary instead of being lost
            PayloadKind::Text => match Utf8Bytes::try_from(payload.data.clone()) {
                Ok(text) => Message::Text(text),
                Err(_) => Message::Binary(payload.data),
            },
            PayloadKind::Binary => Message::Binary(payload.data),
        };

        self.inner.send(message).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Utf8Bytes::from_static(""),
        };
        let sent = self.inner.send(Message::Close(Some(frame))).await;
        let shut = self.inner.close().await;

        sent?;
        shut?;
        Ok(())
    }
}
