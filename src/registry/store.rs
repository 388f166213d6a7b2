//! Session registry implementation
//!
//! The authoritative set of live sessions. Only the connect path inserts and
//! only the teardown path removes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::RegistryError;
use crate::session::{SessionHandle, SessionId};

/// Set of live sessions
///
/// Thread-safe via `RwLock`. Mutations take the write lock; snapshots share
/// the read lock, so the router never observes a half-applied add or remove.
pub struct Registry {
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a session
    ///
    /// An id that is already present is left untouched.
    pub async fn add(&self, session: Arc<SessionHandle>) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.write().await;
        let id = session.id();

        if sessions.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        sessions.insert(id, session);

        tracing::debug!(session_id = %id, members = sessions.len(), "Session registered");
        Ok(())
    }

    /// Remove a session and close its outbound buffer
    ///
    /// Returns the removed handle, or `None` if it was not a member. The
    /// buffer is closed under the write lock, so once this returns no
    /// broadcast can enqueue to the session.
    pub async fn remove(&self, id: SessionId) -> Option<Arc<SessionHandle>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.remove(&id)?;
        session.close_outbound();

        tracing::debug!(session_id = %id, members = sessions.len(), "Session unregistered");
        Some(session)
    }

    /// Point-in-time copy of the current members
    pub async fn snapshot(&self) -> Vec<Arc<SessionHandle>> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Look up a single session
    pub async fn get(&self, id: SessionId) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Check membership
    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Number of members
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the registry has no members
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Payload;
    use crate::session::{EnqueueOutcome, Role, SessionContext};

    fn make_session(id: u64, role: Role) -> Arc<SessionHandle> {
        let ctx = SessionContext::new(SessionId::new(id), role);
        // Receiver dropped: only membership matters here
        Arc::new(SessionHandle::new(ctx, 8).0)
    }

    #[tokio::test]
    async fn test_add_and_snapshot() {
        let registry = Registry::new();
        registry.add(make_session(1, Role::Consumer)).await.unwrap();
        registry.add(make_session(2, Role::Producer)).await.unwrap();

        assert_eq!(registry.len().await, 2);
        assert!(registry.contains(SessionId::new(1)).await);

        let mut ids: Vec<_> = registry
            .snapshot()
            .await
            .iter()
            .map(|s| s.id().get())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_duplicate_add_rejected() {
        let registry = Registry::new();
        let first = make_session(1, Role::Consumer);
        registry.add(Arc::clone(&first)).await.unwrap();

        let result = registry.add(make_session(1, Role::Producer)).await;
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(_))));

        // Original membership untouched
        let kept = registry.get(SessionId::new(1)).await.unwrap();
        assert!(Arc::ptr_eq(&kept, &first));
    }

    #[tokio::test]
    async fn test_remove_closes_buffer_exactly_once() {
        let registry = Registry::new();
        let ctx = SessionContext::new(SessionId::new(3), Role::Consumer);
        let (handle, _rx) = SessionHandle::new(ctx, 8);
        let handle = Arc::new(handle);
        registry.add(Arc::clone(&handle)).await.unwrap();

        let removed = registry.remove(SessionId::new(3)).await;
        assert!(removed.is_some());
        assert!(handle.is_outbound_closed());
        assert_eq!(handle.try_enqueue(Payload::text("late")), EnqueueOutcome::Closed);

        // Second removal is a no-op
        assert!(registry.remove(SessionId::new(3)).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached_from_later_mutation() {
        let registry = Registry::new();
        registry.add(make_session(1, Role::Consumer)).await.unwrap();

        let snapshot = registry.snapshot().await;
        registry.remove(SessionId::new(1)).await;
        registry.add(make_session(2, Role::Consumer)).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), SessionId::new(1));
    }

    #[tokio::test]
    async fn test_concurrent_membership_churn() {
        let registry = Arc::new(Registry::new());
        let mut tasks = Vec::new();

        for id in 1..=32u64 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                registry.add(make_session(id, Role::Consumer)).await.unwrap();
                if id % 2 == 0 {
                    registry.remove(SessionId::new(id)).await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 16);
        assert!(snapshot.iter().all(|s| s.id().get() % 2 == 1));
        assert!(snapshot.iter().all(|s| !s.is_outbound_closed()));
    }
}
