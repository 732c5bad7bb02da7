//! # Warden Registry
//!
//! Account-scoped membership and permission enforcement.
//!
//! ## Overview
//!
//! A [`PermissionRegistry`] holds the members of one account. Its first
//! mutation registers the owner; everyone else enters by invite and becomes
//! active only after accepting. Each member carries a
//! [`PermissionProfile`](warden_core::PermissionProfile) whose levels gate
//! inviting, removing and profile management. The owner can never be
//! removed.
//!
//! A [`Directory`] keeps one registry per owner.
//!
//! ## Key Concepts
//!
//! - **Owner**: the creator, status `Owner`, protected from removal
//! - **Invite**: a pending `Invited` record awaiting its target's acceptance
//! - **Policy**: the minimum levels an acting member needs
//!
//! ## Usage
//!
//! ```rust
//! use warden_core::{Identity, PermissionProfile};
//! use warden_registry::{PermissionRegistry, RegistryError};
//!
//! let owner = Identity::from_bytes([1; 32]);
//! let guest = Identity::from_bytes([2; 32]);
//!
//! let mut registry = PermissionRegistry::new();
//! registry.create_account(owner, PermissionProfile::new(2, 1, 3, 5)).unwrap();
//! registry.add_user(owner, guest).unwrap();
//! registry.accept_invite(guest).unwrap();
//!
//! assert_eq!(
//!     registry.remove_user(guest, owner),
//!     Err(RegistryError::CannotRemoveOwner)
//! );
//! ```

pub mod directory;
pub mod error;
pub mod member;
pub mod policy;
pub mod registry;

pub use directory::Directory;
pub use error::{RegistryError, Result};
pub use member::{MemberRecord, MemberStatus};
pub use policy::PermissionPolicy;
pub use registry::PermissionRegistry;
