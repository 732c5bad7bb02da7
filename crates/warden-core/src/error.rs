//! Error types for Warden Core.

use thiserror::Error;

use crate::crypto::Identity;

/// Core errors that can occur while encoding or verifying commands.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for command structure and signatures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("signature verification failed")]
    SignatureFailed,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("create-account must target the author's own account, got {account}")]
    ForeignAccountCreation { account: Identity },

    /// The command's canonical bytes could not be decoded.
    #[error("structural error: {0}")]
    StructuralError(String),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidSignature => ValidationError::SignatureFailed,
            CoreError::MalformedCommand(msg) | CoreError::DecodingError(msg) => {
                ValidationError::StructuralError(msg)
            }
        }
    }
}
