//! Broadcast router
//!
//! The single consumer of the hub's input stream. Messages are handled one at
//! a time in arrival order; for each one the router takes a registry
//! snapshot and offers the message to every matching session without ever
//! waiting on a slow recipient.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::message::BroadcastMessage;
use super::predicate::FanoutPredicate;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::session::EnqueueOutcome;
use crate::stats::HubMetrics;

/// Producer side of the router's input stream
///
/// Cloned into every session's reader loop.
#[derive(Debug, Clone)]
pub struct RouterInput {
    tx: mpsc::Sender<BroadcastMessage>,
}

impl RouterInput {
    /// Create a bounded input stream
    pub fn channel(capacity: usize) -> (RouterInput, mpsc::Receiver<BroadcastMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (RouterInput { tx }, rx)
    }

    /// Submit a message, waiting while the input is full
    pub async fn send(&self, message: BroadcastMessage) -> Result<()> {
        self.tx.send(message).await.map_err(|_| Error::RouterClosed)
    }

    /// Whether the router has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Result of fanning out one message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Sessions selected by the predicate
    pub matched: usize,
    /// Enqueued successfully
    pub delivered: usize,
    /// Dropped: recipient buffer full
    pub dropped_full: usize,
    /// Dropped: recipient tearing down
    pub dropped_closed: usize,
}

/// The broadcast router
pub struct Router {
    registry: Arc<Registry>,
    predicate: FanoutPredicate,
    metrics: Arc<HubMetrics>,
    input: mpsc::Receiver<BroadcastMessage>,
}

impl Router {
    /// Create a router and the input handle that feeds it
    pub fn new(
        registry: Arc<Registry>,
        predicate: FanoutPredicate,
        metrics: Arc<HubMetrics>,
        capacity: usize,
    ) -> (Router, RouterInput) {
        let (input_tx, input) = RouterInput::channel(capacity);
        let router = Router {
            registry,
            predicate,
            metrics,
            input,
        };
        (router, input_tx)
    }

    /// Fan one message out to the current members
    pub async fn route(&self, message: &BroadcastMessage) -> RouteOutcome {
        let members = self.registry.snapshot().await;
        let mut outcome = RouteOutcome::default();

        for session in &members {
            if !self.predicate.matches(message.origin, session) {
                continue;
            }
            outcome.matched += 1;

            match session.try_enqueue(message.payload.clone()) {
                EnqueueOutcome::Queued => outcome.delivered += 1,
                EnqueueOutcome::Full => {
                    outcome.dropped_full += 1;
                    tracing::trace!(
                        session_id = %session.id(),
                        capacity = session.capacity(),
                        "Outbound buffer full, dropping message"
                    );
                }
                EnqueueOutcome::Closed => outcome.dropped_closed += 1,
            }
        }

        self.metrics.record_route(
            outcome.delivered as u64,
            outcome.dropped_full as u64,
            outcome.dropped_closed as u64,
        );

        tracing::debug!(
            origin = %message.origin,
            size = message.payload.len(),
            members = members.len(),
            delivered = outcome.delivered,
            dropped = outcome.dropped_full + outcome.dropped_closed,
            "Broadcasting message"
        );

        outcome
    }

    /// Process the input stream until every producer handle is gone
    pub async fn run(mut self) {
        tracing::debug!(predicate = self.predicate.name(), "Router started");

        while let Some(message) = self.input.recv().await {
            self.route(&message).await;
        }

        tracing::debug!("Router input closed, stopping");
    }

    /// Run the router on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
