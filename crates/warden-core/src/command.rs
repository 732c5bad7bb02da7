//! Command: a signed request to mutate a permission registry.
//!
//! The author of a command is the caller the registry acts on behalf of.
//! Commands are immutable once signed; their content address is the
//! [`CommandId`].

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_bytes, canonical_header_bytes};
use crate::crypto::{Identity, Keypair, Signature};
use crate::profile::PermissionProfile;
use crate::types::CommandId;

/// The current command schema version.
pub const COMMAND_VERSION: u8 = 0;

/// Discriminator for the operation carried by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum OperationKind {
    /// Register the author as owner of a new account.
    CreateAccount = 0x0001,
    /// Invite a target identity.
    AddUser = 0x0002,
    /// Accept a pending invite.
    AcceptInvite = 0x0003,
    /// Remove a member.
    RemoveUser = 0x0004,
    /// Replace a member's permission profile.
    UpdateProfile = 0x0005,
}

impl OperationKind {
    /// Convert to u16 for serialization.
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Try to parse from u16.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(Self::CreateAccount),
            0x0002 => Some(Self::AddUser),
            0x0003 => Some(Self::AcceptInvite),
            0x0004 => Some(Self::RemoveUser),
            0x0005 => Some(Self::UpdateProfile),
            _ => None,
        }
    }
}

/// A registry operation with its arguments. The caller is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    CreateAccount { profile: PermissionProfile },
    AddUser { target: Identity },
    AcceptInvite,
    RemoveUser { target: Identity },
    UpdateProfile {
        target: Identity,
        profile: PermissionProfile,
    },
}

impl Operation {
    /// The kind discriminator.
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreateAccount { .. } => OperationKind::CreateAccount,
            Operation::AddUser { .. } => OperationKind::AddUser,
            Operation::AcceptInvite => OperationKind::AcceptInvite,
            Operation::RemoveUser { .. } => OperationKind::RemoveUser,
            Operation::UpdateProfile { .. } => OperationKind::UpdateProfile,
        }
    }

    /// The identity this operation acts upon, if it names one.
    pub fn target(&self) -> Option<&Identity> {
        match self {
            Operation::AddUser { target }
            | Operation::RemoveUser { target }
            | Operation::UpdateProfile { target, .. } => Some(target),
            Operation::CreateAccount { .. } | Operation::AcceptInvite => None,
        }
    }

    /// The profile carried by this operation, if any.
    pub fn profile(&self) -> Option<&PermissionProfile> {
        match self {
            Operation::CreateAccount { profile } | Operation::UpdateProfile { profile, .. } => {
                Some(profile)
            }
            _ => None,
        }
    }
}

/// The signed part of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHeader {
    /// Schema version (currently 0).
    pub version: u8,

    /// Who is issuing the command (the caller).
    pub author: Identity,

    /// The account (owner identity) whose registry is targeted.
    pub account: Identity,

    /// Author-chosen nonce. Distinguishes otherwise identical commands.
    pub nonce: u64,

    /// Author-claimed timestamp (Unix milliseconds). Untrusted.
    pub timestamp: i64,

    /// What to do.
    pub operation: Operation,
}

/// A complete command: header + signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// The command header.
    pub header: CommandHeader,

    /// Ed25519 signature over the canonical header bytes.
    pub signature: Signature,
}

impl Command {
    /// Compute the command ID (Blake3 hash of canonical bytes).
    pub fn compute_id(&self) -> CommandId {
        CommandId::digest(&canonical_bytes(self))
    }

    /// The caller identity.
    pub fn author(&self) -> &Identity {
        &self.header.author
    }

    /// The targeted account.
    pub fn account(&self) -> &Identity {
        &self.header.account
    }

    /// The operation.
    pub fn operation(&self) -> &Operation {
        &self.header.operation
    }

    /// The operation kind.
    pub fn kind(&self) -> OperationKind {
        self.header.operation.kind()
    }

    /// The nonce.
    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }
}

/// Builder for creating commands.
pub struct CommandBuilder {
    author: Identity,
    account: Identity,
    nonce: u64,
    timestamp: i64,
    operation: Operation,
}

impl CommandBuilder {
    /// Start building a command from `author` against `account`.
    pub fn new(author: Identity, account: Identity, operation: Operation) -> Self {
        Self {
            author,
            account,
            nonce: 0,
            timestamp: 0,
            operation,
        }
    }

    /// Start a create-account command; the account is the author's own.
    pub fn create_account(author: Identity, profile: PermissionProfile) -> Self {
        Self::new(author, author, Operation::CreateAccount { profile })
    }

    /// Set the nonce.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = ts;
        self
    }

    /// Build and sign the command.
    pub fn sign(self, keypair: &Keypair) -> Command {
        let header = CommandHeader {
            version: COMMAND_VERSION,
            author: self.author,
            account: self.account,
            nonce: self.nonce,
            timestamp: self.timestamp,
            operation: self.operation,
        };

        let signature = keypair.sign(&canonical_header_bytes(&header));

        Command { header, signature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_roundtrip() {
        for kind in [
            OperationKind::CreateAccount,
            OperationKind::AddUser,
            OperationKind::AcceptInvite,
            OperationKind::RemoveUser,
            OperationKind::UpdateProfile,
        ] {
            assert_eq!(OperationKind::from_u16(kind.to_u16()), Some(kind));
        }
        assert_eq!(OperationKind::from_u16(0x00ff), None);
    }

    #[test]
    fn test_create_account_targets_own_account() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let command =
            CommandBuilder::create_account(keypair.identity(), PermissionProfile::new(2, 1, 3, 5))
                .timestamp(1736870400000)
                .sign(&keypair);

        assert_eq!(command.author(), command.account());
        assert_eq!(command.kind(), OperationKind::CreateAccount);
        assert_eq!(
            command.operation().profile(),
            Some(&PermissionProfile::new(2, 1, 3, 5))
        );
    }

    #[test]
    fn test_command_id_deterministic() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let target = Keypair::from_seed(&[0x43; 32]).identity();

        let command = CommandBuilder::new(
            keypair.identity(),
            keypair.identity(),
            Operation::AddUser { target },
        )
        .nonce(7)
        .sign(&keypair);

        assert_eq!(command.compute_id(), command.compute_id());
        assert_eq!(command.operation().target(), Some(&target));
    }

    #[test]
    fn test_nonce_changes_id() {
        let keypair = Keypair::from_seed(&[0x42; 32]);
        let build = |nonce| {
            CommandBuilder::new(keypair.identity(), keypair.identity(), Operation::AcceptInvite)
                .nonce(nonce)
                .sign(&keypair)
        };

        assert_ne!(build(1).compute_id(), build(2).compute_id());
    }
}
