//! Directory: one registry per owner.
//!
//! Creating an account builds a fresh [`PermissionRegistry`] keyed by the
//! creator. Registries never share records, so the same identity can own
//! its own account and be a member of several others.

use std::collections::BTreeMap;

use warden_core::{Identity, Operation, PermissionProfile};

use crate::error::{RegistryError, Result};
use crate::member::MemberRecord;
use crate::policy::PermissionPolicy;
use crate::registry::PermissionRegistry;

/// All accounts known to one runtime, keyed by owner identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    registries: BTreeMap<Identity, PermissionRegistry>,
    policy: PermissionPolicy,
}

impl Directory {
    /// Create an empty directory with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directory whose registries enforce `policy`.
    pub fn with_policy(policy: PermissionPolicy) -> Self {
        Self {
            registries: BTreeMap::new(),
            policy,
        }
    }

    /// Create an account owned by `caller`.
    pub fn create_account(&mut self, caller: Identity, profile: PermissionProfile) -> Result<()> {
        if self.registries.contains_key(&caller) {
            return Err(RegistryError::AlreadyRegistered);
        }

        let mut registry = PermissionRegistry::with_policy(self.policy.clone());
        registry.create_account(caller, profile)?;
        self.registries.insert(caller, registry);
        Ok(())
    }

    /// Invite `target` into `account`.
    pub fn add_user(&mut self, caller: Identity, account: &Identity, target: Identity) -> Result<()> {
        self.registry_mut(account)?.add_user(caller, target)
    }

    /// Accept a pending invite into `account`.
    pub fn accept_invite(&mut self, caller: Identity, account: &Identity) -> Result<()> {
        self.registry_mut(account)?.accept_invite(caller)
    }

    /// Remove `target` from `account`.
    pub fn remove_user(
        &mut self,
        caller: Identity,
        account: &Identity,
        target: Identity,
    ) -> Result<MemberRecord> {
        self.registry_mut(account)?.remove_user(caller, target)
    }

    /// Replace the profile of `target` in `account`.
    pub fn update_profile(
        &mut self,
        caller: Identity,
        account: &Identity,
        target: Identity,
        profile: PermissionProfile,
    ) -> Result<()> {
        self.registry_mut(account)?
            .update_profile(caller, target, profile)
    }

    /// Route a decoded operation to the right registry.
    ///
    /// `CreateAccount` ignores `account`: an owner can only create its own.
    pub fn apply(&mut self, caller: Identity, account: &Identity, operation: &Operation) -> Result<()> {
        match operation {
            Operation::CreateAccount { profile } => self.create_account(caller, *profile),
            other => self.registry_mut(account)?.apply(caller, other),
        }
    }

    /// The registry owned by `account`.
    pub fn registry(&self, account: &Identity) -> Option<&PermissionRegistry> {
        self.registries.get(account)
    }

    /// Owners of every account, in identity order.
    pub fn accounts(&self) -> Vec<Identity> {
        self.registries.keys().copied().collect()
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    /// True if no account has been created.
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }

    /// Copy of one account's registry, for rollback.
    pub fn snapshot(&self, account: &Identity) -> Option<PermissionRegistry> {
        self.registries.get(account).cloned()
    }

    /// Put back a snapshot taken with [`Directory::snapshot`].
    ///
    /// `None` means the account did not exist and is dropped again.
    pub fn restore(&mut self, account: Identity, snapshot: Option<PermissionRegistry>) {
        match snapshot {
            Some(registry) => {
                self.registries.insert(account, registry);
            }
            None => {
                self.registries.remove(&account);
            }
        }
    }

    fn registry_mut(&mut self, account: &Identity) -> Result<&mut PermissionRegistry> {
        self.registries
            .get_mut(account)
            .ok_or(RegistryError::AccountNotFound(*account))
    }
}
