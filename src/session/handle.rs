//! Shared session handle
//!
//! The registry and the router only ever see a session through this handle.
//! It owns the sending side of the session's bounded outbound buffer; the
//! receiving side belongs to the writer pump.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::context::{Role, SessionContext, SessionId};
use super::state::{SessionPhase, SessionState};
use crate::connection::Payload;
use crate::stats::SessionStats;

/// Result of a non-blocking enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Accepted into the outbound buffer
    Queued,
    /// Buffer at capacity; the message was dropped for this session only
    Full,
    /// Buffer closed by teardown or the pump has exited
    Closed,
}

/// Handle to one live session
pub struct SessionHandle {
    ctx: SessionContext,
    state: Mutex<SessionState>,

    /// `None` once teardown has closed the buffer
    outbound: Mutex<Option<mpsc::Sender<Payload>>>,
    capacity: usize,

    enqueued: AtomicU64,
    dropped: AtomicU64,
    received: AtomicU64,
}

impl SessionHandle {
    /// Create a handle and its outbound buffer
    ///
    /// Returns the handle and the receiving side for the writer pump.
    pub fn new(ctx: SessionContext, capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        // tokio panics on a zero-capacity channel
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);

        let handle = Self {
            ctx,
            state: Mutex::new(SessionState::new()),
            outbound: Mutex::new(Some(tx)),
            capacity,
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            received: AtomicU64::new(0),
        };

        (handle, rx)
    }

    /// Session ID
    pub fn id(&self) -> SessionId {
        self.ctx.session_id
    }

    /// Fan-out role
    pub fn role(&self) -> Role {
        self.ctx.role
    }

    /// Session metadata
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.state.lock().phase()
    }

    pub(crate) fn activate(&self) -> bool {
        self.state.lock().activate()
    }

    pub(crate) fn begin_close(&self) -> bool {
        self.state.lock().begin_close()
    }

    pub(crate) fn finish_close(&self) -> bool {
        self.state.lock().finish_close()
    }

    /// Offer a message to the outbound buffer without waiting
    pub fn try_enqueue(&self, payload: Payload) -> EnqueueOutcome {
        let outbound = self.outbound.lock();
        let Some(tx) = outbound.as_ref() else {
            return EnqueueOutcome::Closed;
        };

        match tx.try_send(payload) {
            Ok(()) => {
                self.enqueued.fetch_add(1, Ordering::Relaxed);
                EnqueueOutcome::Queued
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                EnqueueOutcome::Full
            }
            Err(mpsc::error::TrySendError::Closed(_)) => EnqueueOutcome::Closed,
        }
    }

    /// Close the outbound buffer
    ///
    /// Already-queued messages are still drained by the pump. Returns `true`
    /// only for the call that actually released the buffer.
    pub fn close_outbound(&self) -> bool {
        self.outbound.lock().take().is_some()
    }

    /// Whether the outbound buffer has been closed
    pub fn is_outbound_closed(&self) -> bool {
        self.outbound.lock().is_none()
    }

    /// Messages currently waiting in the outbound buffer
    pub fn pending(&self) -> usize {
        match self.outbound.lock().as_ref() {
            Some(tx) => tx.max_capacity() - tx.capacity(),
            None => 0,
        }
    }

    /// Fixed outbound buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of this session's counters
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.ctx.session_id,
            role: self.ctx.role,
            phase: self.phase(),
            received: self.received.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            pending: self.pending(),
            duration: self.ctx.connected_at.elapsed(),
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.ctx.session_id)
            .field("role", &self.ctx.role)
            .field("phase", &self.phase())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_handle(capacity: usize) -> (SessionHandle, mpsc::Receiver<Payload>) {
        let ctx = SessionContext::new(SessionId::new(1), Role::Consumer);
        SessionHandle::new(ctx, capacity)
    }

    #[tokio::test]
    async fn test_enqueue_and_drain() {
        let (handle, mut rx) = make_handle(4);

        assert_eq!(handle.try_enqueue(Payload::text("a")), EnqueueOutcome::Queued);
        assert_eq!(handle.try_enqueue(Payload::text("b")), EnqueueOutcome::Queued);
        assert_eq!(handle.pending(), 2);

        assert_eq!(rx.recv().await.unwrap(), Payload::text("a"));
        assert_eq!(rx.recv().await.unwrap(), Payload::text("b"));
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn test_full_buffer_drops_newest() {
        let (handle, mut rx) = make_handle(2);

        handle.try_enqueue(Payload::text("1"));
        handle.try_enqueue(Payload::text("2"));
        assert_eq!(handle.try_enqueue(Payload::text("3")), EnqueueOutcome::Full);
        assert_eq!(handle.pending(), 2);

        let stats = handle.stats();
        assert_eq!(stats.enqueued, 2);
        assert_eq!(stats.dropped, 1);

        // Oldest entries untouched
        assert_eq!(rx.try_recv().unwrap(), Payload::text("1"));
        assert_eq!(rx.try_recv().unwrap(), Payload::text("2"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_close_releases_once_and_rejects_enqueue() {
        let (handle, mut rx) = make_handle(4);
        handle.try_enqueue(Payload::text("queued before close"));

        assert!(handle.close_outbound());
        assert!(!handle.close_outbound());
        assert!(handle.is_outbound_closed());

        assert_eq!(handle.try_enqueue(Payload::text("late")), EnqueueOutcome::Closed);

        // Pump still drains what was queued, then observes closure
        assert_eq!(rx.recv().await.unwrap(), Payload::text("queued before close"));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_enqueue_after_pump_exit_is_closed() {
        let (handle, rx) = make_handle(4);
        drop(rx);

        assert_eq!(handle.try_enqueue(Payload::text("x")), EnqueueOutcome::Closed);
        assert_eq!(handle.stats().dropped, 0);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (handle, _rx) = make_handle(0);
        assert_eq!(handle.capacity(), 1);
    }

    #[test]
    fn test_phase_follows_lifecycle() {
        let (handle, _rx) = make_handle(1);
        assert_eq!(handle.phase(), SessionPhase::Connecting);
        assert!(handle.activate());
        assert!(handle.begin_close());
        assert!(handle.finish_close());
        assert_eq!(handle.stats().phase, SessionPhase::Closed);
    }
}
