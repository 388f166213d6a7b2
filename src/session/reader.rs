//! Session reader loop
//!
//! Forwards every inbound message to the router. Forwarding waits when the
//! router's input is full: inbound messages are never dropped.

use std::time::Duration;

use super::handle::SessionHandle;
use crate::connection::FrameReader;
use crate::router::{BroadcastMessage, RouterInput};

/// Why the reader loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// Peer closed the connection
    PeerClosed,
    /// Transport error on receive
    ReadFailed,
    /// Nothing received within the idle timeout
    IdleTimeout,
    /// Router stopped accepting input
    RouterClosed,
}

/// Run the reader loop until the connection ends
pub async fn run_reader_loop<R: FrameReader>(
    handle: &SessionHandle,
    mut reader: R,
    router: &RouterInput,
    idle_timeout: Option<Duration>,
) -> ReaderExit {
    let session_id = handle.id();

    loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, reader.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!(
                        session_id = %session_id,
                        idle_secs = limit.as_secs_f64(),
                        "Idle timeout"
                    );
                    return ReaderExit::IdleTimeout;
                }
            },
            None => reader.recv().await,
        };

        let payload = match next {
            Some(Ok(payload)) => payload,
            Some(Err(e)) => {
                if e.is_expected_close() {
                    tracing::debug!(session_id = %session_id, error = %e, "Connection closed");
                } else {
                    tracing::warn!(session_id = %session_id, error = %e, "Read error");
                }
                return ReaderExit::ReadFailed;
            }
            None => return ReaderExit::PeerClosed,
        };

        handle.record_received();
        tracing::trace!(session_id = %session_id, size = payload.len(), "Received message");

        if let Err(e) = router
            .send(BroadcastMessage::new(session_id, payload))
            .await
        {
            tracing::debug!(session_id = %session_id, error = %e, "Router gone, stopping reader");
            return ReaderExit::RouterClosed;
        }
    }
}
