//! Command validation: signature verification and structural checks.

use crate::canonical::canonical_header_bytes;
use crate::command::{Command, Operation, COMMAND_VERSION};
use crate::error::ValidationError;

/// Validate a command's structure and signature.
///
/// This performs:
/// - Version check
/// - Structural rules (create-account targets the author's account)
/// - Signature verification against the author
pub fn validate_command(command: &Command) -> Result<(), ValidationError> {
    validate_command_structure(command)?;

    let message = canonical_header_bytes(&command.header);
    command
        .header
        .author
        .verify(&message, &command.signature)
        .map_err(|_| ValidationError::SignatureFailed)?;

    Ok(())
}

/// Validate command structure without signature verification.
///
/// Useful when the command comes from trusted storage, e.g. journal replay.
pub fn validate_command_structure(command: &Command) -> Result<(), ValidationError> {
    if command.header.version != COMMAND_VERSION {
        return Err(ValidationError::UnsupportedVersion(command.header.version));
    }

    if let Operation::CreateAccount { .. } = command.header.operation {
        if command.header.account != command.header.author {
            return Err(ValidationError::ForeignAccountCreation {
                account: command.header.account,
            });
        }
    }

    Ok(())
}
