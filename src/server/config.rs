//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default WebSocket endpoint path
pub const DEFAULT_PATH: &str = "/echo";

/// Default query parameter carrying the session role
pub const DEFAULT_ROLE_PARAM: &str = "role";

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Request path accepted for upgrade; anything else gets a 404
    pub path: String,

    /// Query parameter used to classify the session role
    pub role_param: String,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Upgrade timeout (handshake must complete within this time)
    pub connection_timeout: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,

    /// Largest accepted inbound message (None = tungstenite default)
    pub max_message_size: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            path: DEFAULT_PATH.to_string(),
            role_param: DEFAULT_ROLE_PARAM.to_string(),
            max_connections: 0, // Unlimited
            connection_timeout: Duration::from_secs(10),
            tcp_nodelay: true, // Important for low latency
            max_message_size: Some(64 * 1024),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the upgrade path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the role query parameter name
    pub fn role_param(mut self, param: impl Into<String>) -> Self {
        self.role_param = param.into();
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set connection timeout
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the inbound message size limit
    pub fn max_message_size(mut self, size: Option<usize>) -> Self {
        self.max_message_size = size;
        self
    }
}
