//! Registry error types
//!
//! Error types for session registry operations.

use crate::session::SessionId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A session with this id is already a member
    AlreadyRegistered(SessionId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::AlreadyRegistered(id) => {
                write!(f, "Session already registered: {}", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
