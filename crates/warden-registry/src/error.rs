//! Error types for the registry.
//!
//! The display strings of the membership errors are matched by external
//! callers as substrings. Do not reword them.

use thiserror::Error;

use warden_core::Identity;

/// Business-rule rejections raised by registry operations.
///
/// None of these are transient. A rejected operation leaves the registry
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Target (or caller, for create) already has an owner or active record.
    #[error("This user is already registered")]
    AlreadyRegistered,

    /// Target already has a pending invite.
    #[error("This user is already invited")]
    AlreadyInvited,

    /// Caller's add level does not meet the policy threshold.
    #[error("This user has no add permission")]
    NoAddPermission,

    /// The owner record can never be removed.
    #[error("Can't remove the owner")]
    CannotRemoveOwner,

    /// Caller has no pending invite to accept.
    #[error("This user is not invited")]
    NotInvited,

    /// The registry already has a different owner.
    #[error("This account is already created")]
    AlreadyCreated,

    /// Target has no record.
    #[error("This user is not registered")]
    NotRegistered,

    /// Caller's remove level does not meet the policy threshold.
    #[error("This user has no remove permission")]
    NoRemovePermission,

    /// Caller's manage level does not meet the policy threshold.
    #[error("This user has no manage permission")]
    NoManagePermission,

    /// No registry is owned by this identity.
    #[error("account not found: {0}")]
    AccountNotFound(Identity),
}

impl RegistryError {
    /// True for the duplicate-registration family.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            RegistryError::AlreadyRegistered
                | RegistryError::AlreadyInvited
                | RegistryError::AlreadyCreated
        )
    }

    /// True if the caller lacked a capability level.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            RegistryError::NoAddPermission
                | RegistryError::NoRemovePermission
                | RegistryError::NoManagePermission
        )
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
