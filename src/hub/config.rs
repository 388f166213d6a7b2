//! Hub configuration

use std::time::Duration;

use crate::router::FanoutPredicate;

/// Default outbound buffer slots per session
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// Default router input capacity
pub const DEFAULT_ROUTER_CAPACITY: usize = 1024;

/// Default time a closing session's writer gets to flush its buffer
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Broadcast hub configuration options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Outbound buffer capacity, fixed per session at creation
    pub outbound_capacity: usize,

    /// Router input capacity; producers wait when it is full
    pub router_capacity: usize,

    /// Recipient selection rule
    pub fanout: FanoutPredicate,

    /// Tear a session down when nothing arrives for this long (None = never)
    pub idle_timeout: Option<Duration>,

    /// How long teardown waits for the writer to flush queued messages
    /// before dropping the connection
    pub drain_timeout: Duration,

    /// Interval for periodic stats logging (None = disabled)
    ///
    /// The logging task is started by `Hub::new` and stops with the hub.
    pub stats_interval: Option<Duration>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            router_capacity: DEFAULT_ROUTER_CAPACITY,
            fanout: FanoutPredicate::default(),
            idle_timeout: None,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            stats_interval: None,
        }
    }
}

impl HubConfig {
    /// Set the per-session outbound buffer capacity
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity.max(1);
        self
    }

    /// Set the router input capacity
    pub fn router_capacity(mut self, capacity: usize) -> Self {
        self.router_capacity = capacity.max(1);
        self
    }

    /// Set the fan-out predicate
    pub fn fanout(mut self, predicate: FanoutPredicate) -> Self {
        self.fanout = predicate;
        self
    }

    /// Set idle timeout
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Set the writer drain deadline used during teardown
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Enable periodic stats logging
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = Some(interval);
        self
    }
}
