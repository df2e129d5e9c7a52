//! Registry error types
//!
//! Both kinds are caller errors. A failed operation leaves the registry
//! untouched.

use super::key::NodeId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No node with this id (never registered, or already swept)
    NotFound(NodeId),
    /// Malformed or missing request field
    InvalidInput(String),
}

impl RegistryError {
    /// Build an `InvalidInput` error
    pub fn invalid(reason: impl Into<String>) -> Self {
        RegistryError::InvalidInput(reason.into())
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NotFound(id) => write!(f, "Node not found: {}", id),
            RegistryError::InvalidInput(reason) => write!(f, "Invalid input: {}", reason),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
