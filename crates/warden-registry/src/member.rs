//! Membership records.

use serde::{Deserialize, Serialize};

use warden_core::{Identity, PermissionProfile};

/// Where an identity sits in the membership lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    /// The registry creator. Active from the start, never removable.
    Owner,
    /// Invited but not yet accepted.
    Invited,
    /// Accepted an invite.
    Active,
}

impl MemberStatus {
    /// Owners and accepted members may act; pending invitees may not.
    pub fn is_active(self) -> bool {
        matches!(self, MemberStatus::Owner | MemberStatus::Active)
    }
}

/// One registered identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// The member's identity (map key).
    pub identity: Identity,

    /// Capability levels.
    pub profile: PermissionProfile,

    /// Lifecycle state.
    pub status: MemberStatus,

    /// True for exactly one record per registry.
    pub is_owner: bool,

    /// Who issued the invite. `None` for the owner.
    pub invited_by: Option<Identity>,
}

impl MemberRecord {
    /// The creator's record.
    ///
    /// The creator is recorded with its own [`MemberStatus::Owner`] status
    /// rather than `Active` plus a flag. [`MemberStatus::is_active`] is true
    /// for both, so the owner acts like any active member, and `is_owner`
    /// is kept in step with the status.
    pub fn owner(identity: Identity, profile: PermissionProfile) -> Self {
        Self {
            identity,
            profile,
            status: MemberStatus::Owner,
            is_owner: true,
            invited_by: None,
        }
    }

    /// A pending invite with an empty profile.
    pub fn invited(identity: Identity, inviter: Identity) -> Self {
        Self {
            identity,
            profile: PermissionProfile::none(),
            status: MemberStatus::Invited,
            is_owner: false,
            invited_by: Some(inviter),
        }
    }

    /// Whether this member may currently act.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether this record is still waiting on acceptance.
    pub fn is_pending(&self) -> bool {
        self.status == MemberStatus::Invited
    }
}
