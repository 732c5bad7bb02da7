//! Error types for the Warden runtime.

use thiserror::Error;
use warden_core::ValidationError;
use warden_journal::JournalError;
use warden_registry::RegistryError;

/// Errors that can occur while submitting or replaying commands.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Command failed signature or structural validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Journal error.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    /// The registry refused the operation. Displays the registry message
    /// unchanged so callers can match on it.
    #[error(transparent)]
    Rejected(#[from] RegistryError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl WardenError {
    /// The registry rejection, if that is what this is.
    pub fn rejection(&self) -> Option<&RegistryError> {
        match self {
            WardenError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for Warden operations.
pub type Result<T> = std::result::Result<T, WardenError>;
