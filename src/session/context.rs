//! Session identity
//!
//! Metadata fixed when a session is created: its id, the peer it came from,
//! and the role it was classified with.

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

/// Opaque per-connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fan-out classification of a session
///
/// Assigned once from connection metadata and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// No (or an unrecognized) role was requested
    #[default]
    Unclassified,
    /// Sends messages into the hub
    Producer,
    /// Receives broadcasts
    Consumer,
}

impl Role {
    /// Classify a raw tag; unknown values fall back to `Unclassified`
    pub fn parse(tag: &str) -> Role {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("producer") {
            Role::Producer
        } else if tag.eq_ignore_ascii_case("consumer") {
            Role::Consumer
        } else {
            Role::Unclassified
        }
    }

    /// Classify from a URL query string such as `role=consumer&x=1`
    ///
    /// The first occurrence of `param` wins.
    pub fn from_query(query: Option<&str>, param: &str) -> Role {
        query
            .and_then(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .find(|(key, _)| key == param)
                    .map(|(_, value)| Role::parse(&value))
            })
            .unwrap_or_default()
    }

    /// Lowercase name, as accepted by [`Role::parse`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unclassified => "unclassified",
            Role::Producer => "producer",
            Role::Consumer => "consumer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a session
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Unique session ID
    pub session_id: SessionId,

    /// Remote peer address, when the transport has one
    pub peer_addr: Option<SocketAddr>,

    /// Fan-out role
    pub role: Role,

    /// When the session was created
    pub connected_at: Instant,
}

impl SessionContext {
    /// Create a new context
    pub fn new(session_id: SessionId, role: Role) -> Self {
        Self {
            session_id,
            peer_addr: None,
            role,
            connected_at: Instant::now(),
        }
    }

    /// Attach the remote address
    pub fn with_peer(mut self, peer_addr: SocketAddr) -> Self {
        self.peer_addr = Some(peer_addr);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("consumer"), Role::Consumer);
        assert_eq!(Role::parse("Producer"), Role::Producer);
        assert_eq!(Role::parse(" CONSUMER "), Role::Consumer);
        assert_eq!(Role::parse("admin"), Role::Unclassified);
        assert_eq!(Role::parse(""), Role::Unclassified);
    }

    #[test]
    fn test_role_from_query() {
        assert_eq!(
            Role::from_query(Some("role=consumer"), "role"),
            Role::Consumer
        );
        assert_eq!(
            Role::from_query(Some("x=1&role=producer&role=consumer"), "role"),
            Role::Producer
        );
        assert_eq!(
            Role::from_query(Some("kind=consumer"), "kind"),
            Role::Consumer
        );
        assert_eq!(Role::from_query(Some("x=1"), "role"), Role::Unclassified);
        assert_eq!(Role::from_query(None, "role"), Role::Unclassified);
    }

    #[test]
    fn test_role_display_roundtrips_through_parse() {
        for role in [Role::Unclassified, Role::Producer, Role::Consumer] {
            assert_eq!(Role::parse(&role.to_string()), role);
        }
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId::new(42).to_string(), "#42");
        assert_eq!(SessionId::new(42).get(), 42);
    }
}
