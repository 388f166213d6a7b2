//! Statistics and metrics for the hub

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::session::{Role, SessionId, SessionPhase};

/// Session-level statistics
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Session ID
    pub session_id: SessionId,
    /// Fan-out role
    pub role: Role,
    /// Lifecycle phase at snapshot time
    pub phase: SessionPhase,
    /// Messages received from the peer
    pub received: u64,
    /// Broadcasts accepted into the outbound buffer
    pub enqueued: u64,
    /// Broadcasts dropped because the buffer was full
    pub dropped: u64,
    /// Messages waiting in the outbound buffer
    pub pending: usize,
    /// Connection duration
    pub duration: Duration,
}

impl SessionStats {
    /// Fraction of offered broadcasts that were dropped
    pub fn drop_ratio(&self) -> f64 {
        let offered = self.enqueued + self.dropped;
        if offered > 0 {
            self.dropped as f64 / offered as f64
        } else {
            0.0
        }
    }
}

/// Hub-wide statistics
#[derive(Debug, Clone, Default)]
pub struct HubStats {
    /// Total sessions ever opened
    pub total_connections: u64,
    /// Sessions currently live
    pub active_connections: u64,
    /// Messages taken from the router input
    pub messages_routed: u64,
    /// Per-recipient enqueues that succeeded
    pub deliveries: u64,
    /// Per-recipient drops on a full buffer
    pub dropped_full: u64,
    /// Per-recipient drops on a closed buffer
    pub dropped_closed: u64,
    /// Uptime
    pub uptime: Duration,
}

impl HubStats {
    /// All per-recipient drops
    pub fn total_dropped(&self) -> u64 {
        self.dropped_full + self.dropped_closed
    }
}

/// Live counters shared by the hub, its sessions and the router
#[derive(Debug)]
pub struct HubMetrics {
    started_at: Instant,
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    messages_routed: AtomicU64,
    deliveries: AtomicU64,
    dropped_full: AtomicU64,
    dropped_closed: AtomicU64,
}

impl HubMetrics {
    /// Create zeroed counters; uptime starts now
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_connections: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            messages_routed: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            dropped_full: AtomicU64::new(0),
            dropped_closed: AtomicU64::new(0),
        }
    }

    pub(crate) fn session_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn session_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn record_route(&self, delivered: u64, dropped_full: u64, dropped_closed: u64) {
        self.messages_routed.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered, Ordering::Relaxed);
        self.dropped_full.fetch_add(dropped_full, Ordering::Relaxed);
        self.dropped_closed.fetch_add(dropped_closed, Ordering::Relaxed);
    }

    /// Point-in-time snapshot
    pub fn snapshot(&self) -> HubStats {
        HubStats {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            messages_routed: self.messages_routed.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_closed: self.dropped_closed.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for HubMetrics {
    fn default() -> Self {
        Self::new()
    }
}
