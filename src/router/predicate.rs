//! Fan-out predicate
//!
//! Decides, for a message and a candidate session, whether delivery is
//! attempted. The role filter is pluggable; delivery back to the sender is a
//! separate switch.

use std::fmt;
use std::sync::Arc;

use crate::session::{Role, SessionHandle, SessionId};

type RoleFilter = dyn Fn(Role) -> bool + Send + Sync;

/// Rule selecting the recipients of each broadcast
#[derive(Clone)]
pub struct FanoutPredicate {
    name: &'static str,
    accepts: Arc<RoleFilter>,
    deliver_to_origin: bool,
}

impl FanoutPredicate {
    /// Deliver to `Consumer` sessions only, never back to the sender
    pub fn consumers() -> Self {
        Self {
            name: "consumers",
            accepts: Arc::new(|role| role == Role::Consumer),
            deliver_to_origin: false,
        }
    }

    /// Deliver to every session, the sender included
    ///
    /// This is plain echo-hub behaviour with no role distinction.
    pub fn everyone() -> Self {
        Self {
            name: "everyone",
            accepts: Arc::new(|_| true),
            deliver_to_origin: true,
        }
    }

    /// Custom role filter; the sender is excluded unless re-enabled with
    /// [`deliver_to_origin`](Self::deliver_to_origin)
    pub fn from_fn<F>(name: &'static str, accepts: F) -> Self
    where
        F: Fn(Role) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            accepts: Arc::new(accepts),
            deliver_to_origin: false,
        }
    }

    /// Set whether a sender receives its own messages
    pub fn deliver_to_origin(mut self, deliver: bool) -> Self {
        self.deliver_to_origin = deliver;
        self
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether sessions with this role take part in fan-out
    pub fn accepts_role(&self, role: Role) -> bool {
        (self.accepts)(role)
    }

    /// Whether a message from `origin` should be offered to `candidate`
    pub fn matches(&self, origin: SessionId, candidate: &SessionHandle) -> bool {
        if candidate.id() == origin && !self.deliver_to_origin {
            return false;
        }
        self.accepts_role(candidate.role())
    }
}

impl Default for FanoutPredicate {
    fn default() -> Self {
        Self::consumers()
    }
}

impl fmt::Debug for FanoutPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutPredicate")
            .field("name", &self.name)
            .field("deliver_to_origin", &self.deliver_to_origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionContext;

    fn session(id: u64, role: Role) -> SessionHandle {
        SessionHandle::new(SessionContext::new(SessionId::new(id), role), 1).0
    }

    #[test]
    fn test_consumers_default() {
        let predicate = FanoutPredicate::default();
        let origin = SessionId::new(1);

        assert!(!predicate.matches(origin, &session(1, Role::Consumer)));
        assert!(predicate.matches(origin, &session(2, Role::Consumer)));
        assert!(!predicate.matches(origin, &session(3, Role::Unclassified)));
        assert!(!predicate.matches(origin, &session(4, Role::Producer)));
    }

    #[test]
    fn test_everyone_includes_origin() {
        let predicate = FanoutPredicate::everyone();
        let origin = SessionId::new(1);

        assert!(predicate.matches(origin, &session(1, Role::Unclassified)));
        assert!(predicate.matches(origin, &session(2, Role::Producer)));
    }

    #[test]
    fn test_custom_filter() {
        let predicate = FanoutPredicate::from_fn("non-producers", |role| role != Role::Producer);
        let origin = SessionId::new(1);

        assert_eq!(predicate.name(), "non-producers");
        assert!(predicate.matches(origin, &session(2, Role::Unclassified)));
        assert!(!predicate.matches(origin, &session(3, Role::Producer)));
        assert!(!predicate.matches(origin, &session(1, Role::Unclassified)));

        let echoing = predicate.deliver_to_origin(true);
        assert!(echoing.matches(origin, &session(1, Role::Unclassified)));
    }
}
