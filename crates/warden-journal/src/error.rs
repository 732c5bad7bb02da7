//! Error types for the journal module.

use thiserror::Error;

/// Errors that can occur during journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    /// A writer panicked while holding the journal lock.
    #[error("journal lock poisoned")]
    LockPoisoned,

    /// Stored bytes disagree with the command they were cached for.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;
