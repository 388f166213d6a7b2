//! Broadcast hub
//!
//! Owns the registry, the router and the shared counters, and drives each
//! session through its lifecycle:
//!
//! 1. `Connecting` → `Active`: handle created, registered, writer pump spawned
//! 2. reader loop forwards inbound messages to the router
//! 3. `Closing`: reader ended; session unregistered, outbound buffer closed
//! 4. `Closed`: pump drained, failed or aborted after the drain deadline;
//!    connection halves dropped
//!
//! A failure in one session only ever tears down that session.

pub mod config;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::connection::Connection;
use crate::error::Result;
use crate::registry::Registry;
use crate::router::{Router, RouterInput};
use crate::session::{
    run_reader_loop, run_writer_pump, PumpExit, Role, SessionContext, SessionHandle, SessionId,
};
use crate::stats::{HubMetrics, HubStats, SessionStats};

pub use config::HubConfig;

/// A running session
pub struct SessionTask {
    handle: Arc<SessionHandle>,
    join: JoinHandle<SessionStats>,
}

impl SessionTask {
    /// Session ID
    pub fn id(&self) -> SessionId {
        self.handle.id()
    }

    /// Shared handle, for inspecting phase and counters
    pub fn handle(&self) -> &Arc<SessionHandle> {
        &self.handle
    }

    /// Whether the session has fully closed
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the session to close and return its final counters
    pub async fn wait(self) -> SessionStats {
        match self.join.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(session_id = %self.handle.id(), error = %e, "Session task failed");
                self.handle.stats()
            }
        }
    }
}

/// The broadcast hub
pub struct Hub {
    config: HubConfig,
    registry: Arc<Registry>,
    input: RouterInput,
    metrics: Arc<HubMetrics>,
    next_session_id: AtomicU64,
    stats_task: Option<JoinHandle<()>>,
}

impl Hub {
    /// Create a hub and start its router
    ///
    /// Must be called from within a tokio runtime. The router stops once the
    /// hub and every session it spawned are gone. If `stats_interval` is set,
    /// a stats logging task runs until the hub is dropped.
    pub fn new(config: HubConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let metrics = Arc::new(HubMetrics::new());

        let (router, input) = Router::new(
            Arc::clone(&registry),
            config.fanout.clone(),
            Arc::clone(&metrics),
            config.router_capacity,
        );
        router.spawn();

        let stats_task = config
            .stats_interval
            .map(|interval| spawn_stats_logger(Arc::clone(&metrics), interval));

        tracing::debug!(
            outbound_capacity = config.outbound_capacity,
            router_capacity = config.router_capacity,
            fanout = config.fanout.name(),
            "Hub started"
        );

        Self {
            config,
            registry,
            input,
            metrics,
            next_session_id: AtomicU64::new(1),
            stats_task,
        }
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Get a reference to the session registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Producer handle for the router input
    pub fn input(&self) -> &RouterInput {
        &self.input
    }

    /// Hub-wide counters
    pub fn stats(&self) -> HubStats {
        self.metrics.snapshot()
    }

    /// Allocate a fresh session ID
    pub fn next_session_id(&self) -> SessionId {
        SessionId::new(self.next_session_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Start a session for an upgraded connection
    pub async fn connect<C: Connection>(&self, connection: C, role: Role) -> Result<SessionTask> {
        let ctx = SessionContext::new(self.next_session_id(), role);
        self.connect_with_context(connection, ctx).await
    }

    /// Start a session with caller-supplied metadata
    ///
    /// Fails if the session ID is already registered; the connection is
    /// dropped in that case.
    pub async fn connect_with_context<C: Connection>(
        &self,
        connection: C,
        ctx: SessionContext,
    ) -> Result<SessionTask> {
        let session_id = ctx.session_id;
        let role = ctx.role;
        let peer_addr = ctx.peer_addr;

        let (handle, outbound) = SessionHandle::new(ctx, self.config.outbound_capacity);
        let handle = Arc::new(handle);
        let (reader, writer) = connection.split();

        handle.activate();
        if let Err(e) = self.registry.add(Arc::clone(&handle)).await {
            tracing::warn!(session_id = %session_id, error = %e, "Rejecting session");
            handle.begin_close();
            handle.close_outbound();
            handle.finish_close();
            return Err(e.into());
        }
        self.metrics.session_opened();

        tracing::info!(
            session_id = %session_id,
            role = %role,
            peer = ?peer_addr,
            "Session active"
        );

        let pump = tokio::spawn(run_writer_pump(session_id, writer, outbound));

        let registry = Arc::clone(&self.registry);
        let metrics = Arc::clone(&self.metrics);
        let input = self.input.clone();
        let idle_timeout = self.config.idle_timeout;
        let drain_timeout = self.config.drain_timeout;
        let session = Arc::clone(&handle);

        let join = tokio::spawn(async move {
            let reader_exit = run_reader_loop(&session, reader, &input, idle_timeout).await;
            drop(input);

            session.begin_close();
            if registry.remove(session_id).await.is_none() {
                tracing::warn!(session_id = %session_id, "Session missing from registry at teardown");
            }

            let pump_exit = finish_pump(session_id, pump, drain_timeout).await;

            session.finish_close();
            metrics.session_closed();

            let stats = session.stats();
            tracing::info!(
                session_id = %session_id,
                reader = ?reader_exit,
                writer = ?pump_exit,
                received = stats.received,
                enqueued = stats.enqueued,
                dropped = stats.dropped,
                duration_ms = stats.duration.as_millis() as u64,
                "Session closed"
            );
            stats
        });

        Ok(SessionTask { handle, join })
    }

    /// Whether periodic stats logging is running
    pub fn is_logging_stats(&self) -> bool {
        self.stats_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Hub {
    fn drop(&mut self) {
        if let Some(task) = self.stats_task.take() {
            task.abort();
        }
    }
}

fn spawn_stats_logger(metrics: Arc<HubMetrics>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let stats = metrics.snapshot();
            tracing::info!(
                active = stats.active_connections,
                total = stats.total_connections,
                routed = stats.messages_routed,
                delivered = stats.deliveries,
                dropped_full = stats.dropped_full,
                dropped_closed = stats.dropped_closed,
                "Hub stats"
            );
        }
    })
}

/// Wait for the writer pump, dropping the connection if it misses the deadline
///
/// A peer that stops reading leaves the pump blocked in a write; aborting
/// the task drops the writer, which closes the transport.
async fn finish_pump(
    session_id: SessionId,
    mut pump: JoinHandle<PumpExit>,
    deadline: Duration,
) -> PumpExit {
    match tokio::time::timeout(deadline, &mut pump).await {
        Ok(Ok(exit)) => exit,
        Ok(Err(e)) => {
            tracing::warn!(session_id = %session_id, error = %e, "Writer pump panicked");
            PumpExit::WriteFailed
        }
        Err(_) => {
            tracing::warn!(
                session_id = %session_id,
                deadline_ms = deadline.as_millis() as u64,
                "Writer did not drain in time, dropping connection"
            );
            pump.abort();
            // Wait for the cancelled task so the writer is gone before Closed
            let _ = pump.await;
            PumpExit::Aborted
        }
    }
}
