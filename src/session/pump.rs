//! Writer pump
//!
//! Drains one session's outbound buffer onto its connection. The pump never
//! retries: a failed write ends it, and the reader loop notices the broken
//! connection on its own and drives teardown.

use tokio::sync::mpsc;

use super::context::SessionId;
use crate::connection::{FrameWriter, Payload};

/// Why the pump stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// Buffer closed and fully drained; close notification attempted
    Drained,
    /// A write failed; remaining messages were abandoned
    WriteFailed,
    /// Teardown gave up waiting and dropped the connection
    Aborted,
}

/// Run the pump until the buffer is closed and empty, or a write fails
pub async fn run_writer_pump<W: FrameWriter>(
    session_id: SessionId,
    mut writer: W,
    mut outbound: mpsc::Receiver<Payload>,
) -> PumpExit {
    let mut written: u64 = 0;

    while let Some(payload) = outbound.recv().await {
        if let Err(e) = writer.send(payload).await {
            if e.is_expected_close() {
                tracing::debug!(session_id = %session_id, error = %e, "Write to closed connection");
            } else {
                tracing::warn!(session_id = %session_id, error = %e, "Write error");
            }
            return PumpExit::WriteFailed;
        }
        written += 1;
    }

    // Best effort: the peer may already be gone
    if let Err(e) = writer.close().await {
        tracing::trace!(session_id = %session_id, error = %e, "Close notification not delivered");
    }

    tracing::debug!(session_id = %session_id, written, "Writer pump drained");
    PumpExit::Drained
}
