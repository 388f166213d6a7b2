//! Session state machine
//!
//! Tracks a session from upgrade to teardown. Transitions only move forward;
//! a closed session never becomes active again.

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    /// Transport upgrade in progress
    Connecting,
    /// Registered; reader forwarding to the router, pump draining the buffer
    Active,
    /// Removed from the registry, outbound buffer closed
    Closing,
    /// Terminal
    Closed,
}

/// Lifecycle state of one session
#[derive(Debug)]
pub struct SessionState {
    phase: SessionPhase,
}

impl SessionState {
    /// Create a state in the `Connecting` phase
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Connecting,
        }
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Upgrade succeeded
    pub fn activate(&mut self) -> bool {
        self.advance(SessionPhase::Connecting, SessionPhase::Active)
    }

    /// Reader loop ended; teardown starts
    pub fn begin_close(&mut self) -> bool {
        self.advance(SessionPhase::Active, SessionPhase::Closing)
    }

    /// Writer pump finished and the connection is released
    pub fn finish_close(&mut self) -> bool {
        self.advance(SessionPhase::Closing, SessionPhase::Closed)
    }

    /// Check if session is active
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    fn advance(&mut self, from: SessionPhase, to: SessionPhase) -> bool {
        if self.phase != from {
            tracing::warn!(current = ?self.phase, requested = ?to, "Ignoring invalid session transition");
            return false;
        }
        self.phase = to;
        true
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
