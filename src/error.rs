//! Error types for the broadcast hub
//!
//! Transport failures are scoped to the session that produced them; they are
//! surfaced here so the session can log them and tear itself down.

use std::fmt;
use std::io;

use tokio_tungstenite::tungstenite;

use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Socket-level I/O failure
    Io(io::Error),
    /// WebSocket protocol or transport failure
    WebSocket(tungstenite::Error),
    /// Registry membership error
    Registry(RegistryError),
    /// The connection was already closed when a write was attempted
    ConnectionClosed,
    /// The router's input stream is gone; the hub is shutting down
    RouterClosed,
    /// No frame arrived within the configured idle timeout
    IdleTimeout,
    /// The upgrade handshake did not complete in time
    HandshakeTimeout,
}

impl Error {
    /// Whether this error is the ordinary end of a connection rather than a fault
    pub fn is_expected_close(&self) -> bool {
        match self {
            Error::ConnectionClosed => true,
            Error::WebSocket(e) => matches!(
                e,
                tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::AlreadyClosed
                    | tungstenite::Error::Protocol(
                        tungstenite::error::ProtocolError::ResetWithoutClosingHandshake
                    )
            ),
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::ConnectionClosed => write!(f, "Connection closed"),
            Error::RouterClosed => write!(f, "Router input closed"),
            Error::IdleTimeout => write!(f, "Idle timeout"),
            Error::HandshakeTimeout => write!(f, "Handshake timeout"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::WebSocket(e) => Some(e),
            Error::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<tungstenite::Error> for Error {
    fn from(e: tungstenite::Error) -> Self {
        Error::WebSocket(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}
