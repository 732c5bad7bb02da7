//! The permission registry state machine.
//!
//! One registry holds every membership record of a single account. All
//! checks run before any mutation, so a rejected call leaves the registry
//! equal to its pre-call state.
//!
//! Per identity the lifecycle is:
//!
//! ```text
//!   ∅ ──create──▶ Owner            (never leaves)
//!   ∅ ──invite──▶ Invited ──accept──▶ Active
//!   Invited | Active ──remove──▶ ∅
//! ```

use std::collections::BTreeMap;

use warden_core::{Identity, Operation, PermissionProfile};

use crate::error::{RegistryError, Result};
use crate::member::{MemberRecord, MemberStatus};
use crate::policy::PermissionPolicy;

/// Membership state for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionRegistry {
    /// Set once by `create_account`, never cleared.
    owner: Option<Identity>,

    /// All records, ordered by identity bytes.
    members: BTreeMap<Identity, MemberRecord>,

    /// Capability thresholds.
    policy: PermissionPolicy,
}

impl PermissionRegistry {
    /// Create an empty registry with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given policy.
    pub fn with_policy(policy: PermissionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `caller` as the owner of this registry.
    pub fn create_account(&mut self, caller: Identity, profile: PermissionProfile) -> Result<()> {
        if self.members.contains_key(&caller) {
            return Err(RegistryError::AlreadyRegistered);
        }
        if self.owner.is_some() {
            return Err(RegistryError::AlreadyCreated);
        }

        self.owner = Some(caller);
        self.members
            .insert(caller, MemberRecord::owner(caller, profile));

        tracing::debug!("account created by {} with profile {:?}", caller, profile);
        Ok(())
    }

    /// Invite `target` on behalf of `caller`.
    ///
    /// Duplicate checks on the target come before the permission check on
    /// the caller.
    pub fn add_user(&mut self, caller: Identity, target: Identity) -> Result<()> {
        if let Some(existing) = self.members.get(&target) {
            return Err(match existing.status {
                MemberStatus::Invited => RegistryError::AlreadyInvited,
                MemberStatus::Owner | MemberStatus::Active => RegistryError::AlreadyRegistered,
            });
        }

        if !self
            .acting_profile(&caller)
            .is_some_and(|p| self.policy.permits_add(p))
        {
            return Err(RegistryError::NoAddPermission);
        }

        self.members
            .insert(target, MemberRecord::invited(target, caller));

        tracing::debug!("{} invited {}", caller, target);
        Ok(())
    }

    /// Accept the pending invite addressed to `caller`.
    pub fn accept_invite(&mut self, caller: Identity) -> Result<()> {
        match self.members.get_mut(&caller) {
            Some(record) if record.status == MemberStatus::Invited => {
                record.status = MemberStatus::Active;
                tracing::debug!("{} accepted invite", caller);
                Ok(())
            }
            _ => Err(RegistryError::NotInvited),
        }
    }

    /// Remove `target` on behalf of `caller`, returning the deleted record.
    ///
    /// The owner can never be removed, not even by itself.
    pub fn remove_user(&mut self, caller: Identity, target: Identity) -> Result<MemberRecord> {
        if self.owner == Some(target) {
            return Err(RegistryError::CannotRemoveOwner);
        }

        if !self.members.contains_key(&target) {
            return Err(RegistryError::NotRegistered);
        }

        if !self
            .acting_profile(&caller)
            .is_some_and(|p| self.policy.permits_remove(p))
        {
            return Err(RegistryError::NoRemovePermission);
        }

        let removed = self
            .members
            .remove(&target)
            .ok_or(RegistryError::NotRegistered)?;

        tracing::debug!("{} removed {}", caller, target);
        Ok(removed)
    }

    /// Replace the profile of `target` on behalf of `caller`.
    ///
    /// Only the owner may change the owner's own profile.
    pub fn update_profile(
        &mut self,
        caller: Identity,
        target: Identity,
        profile: PermissionProfile,
    ) -> Result<()> {
        if !self.members.contains_key(&target) {
            return Err(RegistryError::NotRegistered);
        }

        let permitted = self
            .acting_profile(&caller)
            .is_some_and(|p| self.policy.permits_manage(p));
        if !permitted || (self.owner == Some(target) && caller != target) {
            return Err(RegistryError::NoManagePermission);
        }

        if let Some(record) = self.members.get_mut(&target) {
            record.profile = profile;
        }

        tracing::debug!("{} set profile of {} to {:?}", caller, target, profile);
        Ok(())
    }

    /// Dispatch a decoded operation issued by `caller`.
    pub fn apply(&mut self, caller: Identity, operation: &Operation) -> Result<()> {
        match operation {
            Operation::CreateAccount { profile } => self.create_account(caller, *profile),
            Operation::AddUser { target } => self.add_user(caller, *target),
            Operation::AcceptInvite => self.accept_invite(caller),
            Operation::RemoveUser { target } => self.remove_user(caller, *target).map(|_| ()),
            Operation::UpdateProfile { target, profile } => {
                self.update_profile(caller, *target, *profile)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The owner, once the account has been created.
    pub fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    /// The record for `identity`.
    pub fn member(&self, identity: &Identity) -> Option<&MemberRecord> {
        self.members.get(identity)
    }

    /// The status of `identity`, if registered.
    pub fn status_of(&self, identity: &Identity) -> Option<MemberStatus> {
        self.members.get(identity).map(|r| r.status)
    }

    /// Whether `identity` has any record.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains_key(identity)
    }

    /// Whether `identity` is the owner or an accepted member.
    pub fn is_active(&self, identity: &Identity) -> bool {
        self.members.get(identity).is_some_and(MemberRecord::is_active)
    }

    /// All records in identity order.
    pub fn members(&self) -> impl Iterator<Item = &MemberRecord> {
        self.members.values()
    }

    /// Records still waiting on acceptance.
    pub fn pending_invites(&self) -> Vec<&MemberRecord> {
        self.members.values().filter(|r| r.is_pending()).collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True before `create_account`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The thresholds this registry enforces.
    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    /// The profile `caller` may act with. Pending invitees and strangers have none.
    fn acting_profile(&self, caller: &Identity) -> Option<&PermissionProfile> {
        self.members
            .get(caller)
            .filter(|r| r.is_active())
            .map(|r| &r.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> Identity {
        Identity::from_bytes([n; 32])
    }

    /// Owner `1` with a full profile.
    fn owned() -> PermissionRegistry {
        let mut registry = PermissionRegistry::new();
        registry
            .create_account(id(1), PermissionProfile::new(2, 1, 3, 5))
            .unwrap();
        registry
    }

    #[test]
    fn test_create_account() {
        let registry = owned();

        assert_eq!(registry.owner(), Some(&id(1)));
        let record = registry.member(&id(1)).unwrap();
        assert!(record.is_owner);
        assert_eq!(record.status, MemberStatus::Owner);
        assert_eq!(record.profile, PermissionProfile::new(2, 1, 3, 5));
        assert!(registry.is_active(&id(1)));
    }

    #[test]
    fn test_create_account_twice() {
        let mut registry = owned();
        let before = registry.clone();

        assert_eq!(
            registry.create_account(id(1), PermissionProfile::new(1, 2, 2, 10)),
            Err(RegistryError::AlreadyRegistered)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_second_owner_rejected() {
        let mut registry = owned();
        let before = registry.clone();

        assert_eq!(
            registry.create_account(id(2), PermissionProfile::default()),
            Err(RegistryError::AlreadyCreated)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_add_owner_again() {
        let mut registry = owned();

        assert_eq!(
            registry.add_user(id(1), id(1)),
            Err(RegistryError::AlreadyRegistered)
        );
    }

    #[test]
    fn test_invite_then_accept() {
        let mut registry = owned();

        registry.add_user(id(1), id(2)).unwrap();
        let record = registry.member(&id(2)).unwrap();
        assert_eq!(record.status, MemberStatus::Invited);
        assert!(!record.is_owner);
        assert!(record.profile.is_empty());
        assert_eq!(record.invited_by, Some(id(1)));
        assert!(!registry.is_active(&id(2)));
        assert_eq!(registry.pending_invites().len(), 1);

        // The invitee re-inviting itself hits the duplicate check first.
        assert_eq!(
            registry.add_user(id(2), id(2)),
            Err(RegistryError::AlreadyInvited)
        );

        registry.accept_invite(id(2)).unwrap();
        assert_eq!(registry.status_of(&id(2)), Some(MemberStatus::Active));
        assert!(registry.pending_invites().is_empty());

        assert_eq!(registry.accept_invite(id(2)), Err(RegistryError::NotInvited));
        assert_eq!(
            registry.add_user(id(1), id(2)),
            Err(RegistryError::AlreadyRegistered)
        );
    }

    #[test]
    fn test_accept_without_invite() {
        let mut registry = owned();

        assert_eq!(registry.accept_invite(id(9)), Err(RegistryError::NotInvited));
        assert_eq!(registry.accept_invite(id(1)), Err(RegistryError::NotInvited));
    }

    #[test]
    fn test_no_add_permission() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();
        registry.accept_invite(id(2)).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.add_user(id(2), id(3)),
            Err(RegistryError::NoAddPermission)
        );
        assert!(!registry.contains(&id(3)));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_owner_without_add_level() {
        let mut registry = PermissionRegistry::new();
        registry
            .create_account(id(1), PermissionProfile::new(5, 0, 5, 5))
            .unwrap();

        assert_eq!(
            registry.add_user(id(1), id(2)),
            Err(RegistryError::NoAddPermission)
        );
    }

    #[test]
    fn test_stranger_cannot_invite() {
        let mut registry = owned();

        assert_eq!(
            registry.add_user(id(8), id(9)),
            Err(RegistryError::NoAddPermission)
        );
    }

    #[test]
    fn test_pending_invitee_cannot_act_with_granted_profile() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();
        registry
            .update_profile(id(1), id(2), PermissionProfile::new(1, 1, 1, 1))
            .unwrap();

        assert_eq!(
            registry.add_user(id(2), id(3)),
            Err(RegistryError::NoAddPermission)
        );

        registry.accept_invite(id(2)).unwrap();
        assert!(registry.add_user(id(2), id(3)).is_ok());
    }

    #[test]
    fn test_cannot_remove_owner() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();
        registry.accept_invite(id(2)).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.remove_user(id(2), id(1)),
            Err(RegistryError::CannotRemoveOwner)
        );
        assert_eq!(
            registry.remove_user(id(1), id(1)),
            Err(RegistryError::CannotRemoveOwner)
        );
        assert_eq!(
            registry.remove_user(id(7), id(1)),
            Err(RegistryError::CannotRemoveOwner)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_remove_then_reinvite() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();
        registry.accept_invite(id(2)).unwrap();

        let removed = registry.remove_user(id(1), id(2)).unwrap();
        assert_eq!(removed.identity, id(2));
        assert!(!registry.contains(&id(2)));
        assert_eq!(registry.len(), 1);

        registry.add_user(id(1), id(2)).unwrap();
        assert_eq!(registry.status_of(&id(2)), Some(MemberStatus::Invited));
    }

    #[test]
    fn test_remove_pending_invite() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();

        registry.remove_user(id(1), id(2)).unwrap();
        assert_eq!(registry.accept_invite(id(2)), Err(RegistryError::NotInvited));
    }

    #[test]
    fn test_remove_absent() {
        let mut registry = owned();

        assert_eq!(
            registry.remove_user(id(1), id(5)),
            Err(RegistryError::NotRegistered)
        );
    }

    #[test]
    fn test_no_remove_permission() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();
        registry.accept_invite(id(2)).unwrap();
        registry.add_user(id(1), id(3)).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.remove_user(id(2), id(3)),
            Err(RegistryError::NoRemovePermission)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_update_profile() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();
        registry.accept_invite(id(2)).unwrap();

        registry
            .update_profile(id(1), id(2), PermissionProfile::new(0, 1, 0, 0))
            .unwrap();
        assert_eq!(
            registry.member(&id(2)).unwrap().profile,
            PermissionProfile::new(0, 1, 0, 0)
        );

        // Add level alone does not grant manage.
        assert_eq!(
            registry.update_profile(id(2), id(2), PermissionProfile::new(9, 9, 9, 9)),
            Err(RegistryError::NoManagePermission)
        );
        assert_eq!(
            registry.update_profile(id(1), id(4), PermissionProfile::default()),
            Err(RegistryError::NotRegistered)
        );
    }

    #[test]
    fn test_only_owner_updates_owner_profile() {
        let mut registry = owned();
        registry.add_user(id(1), id(2)).unwrap();
        registry.accept_invite(id(2)).unwrap();
        registry
            .update_profile(id(1), id(2), PermissionProfile::new(0, 0, 0, 9))
            .unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.update_profile(id(2), id(1), PermissionProfile::none()),
            Err(RegistryError::NoManagePermission)
        );
        assert_eq!(registry, before);

        registry
            .update_profile(id(1), id(1), PermissionProfile::new(1, 1, 1, 1))
            .unwrap();
        assert!(registry.member(&id(1)).unwrap().is_owner);
    }

    #[test]
    fn test_apply_dispatch() {
        let mut registry = PermissionRegistry::new();

        registry
            .apply(
                id(1),
                &Operation::CreateAccount {
                    profile: PermissionProfile::new(2, 1, 3, 5),
                },
            )
            .unwrap();
        registry
            .apply(id(1), &Operation::AddUser { target: id(2) })
            .unwrap();
        registry.apply(id(2), &Operation::AcceptInvite).unwrap();
        assert!(registry.is_active(&id(2)));

        registry
            .apply(id(1), &Operation::RemoveUser { target: id(2) })
            .unwrap();
        assert!(!registry.contains(&id(2)));
    }

    #[test]
    fn test_empty_registry() {
        let mut registry = PermissionRegistry::new();

        assert!(registry.is_empty());
        assert_eq!(registry.owner(), None);
        assert_eq!(
            registry.add_user(id(1), id(2)),
            Err(RegistryError::NoAddPermission)
        );
        assert_eq!(
            registry.remove_user(id(1), id(2)),
            Err(RegistryError::NotRegistered)
        );
    }

    #[test]
    fn test_members_ordered() {
        let mut registry = PermissionRegistry::new();
        registry
            .create_account(id(5), PermissionProfile::new(0, 1, 0, 0))
            .unwrap();
        registry.add_user(id(5), id(9)).unwrap();
        registry.add_user(id(5), id(2)).unwrap();

        let order: Vec<Identity> = registry.members().map(|r| r.identity).collect();
        assert_eq!(order, vec![id(2), id(5), id(9)]);
    }

    #[test]
    fn test_custom_policy() {
        let mut registry = PermissionRegistry::with_policy(PermissionPolicy {
            min_add_level: 2,
            ..PermissionPolicy::default()
        });
        registry
            .create_account(id(1), PermissionProfile::new(2, 1, 3, 5))
            .unwrap();

        assert_eq!(
            registry.add_user(id(1), id(2)),
            Err(RegistryError::NoAddPermission)
        );
        assert_eq!(registry.policy().min_add_level, 2);
    }
}
