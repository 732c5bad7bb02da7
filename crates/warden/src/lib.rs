//! # Warden
//!
//! The unified API for Warden: account-scoped permission registries driven
//! by signed commands.
//!
//! ## Overview
//!
//! Warden provides a library for:
//!
//! - **Accounts**: Each owner holds exactly one account with a permission profile
//! - **Invites**: Members with enough add permission invite others, who must accept
//! - **Removal**: Members with remove permission remove anyone but the owner
//! - **Journal**: Every applied command is logged and can be replayed
//!
//! ## Key Concepts
//!
//! - **Command**: A signed request. The signature authenticates the caller.
//! - **Registry**: The members of one account and their profiles.
//! - **Profile**: Four permission levels: create, add, remove, manage.
//! - **Rejection**: A refused command changes nothing and is not journaled.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use warden::{Warden, WardenConfig};
//! use warden::core::{Keypair, PermissionProfile};
//! use warden::journal::MemoryJournal;
//!
//! async fn example() -> warden::Result<()> {
//!     let warden = Warden::new(MemoryJournal::new(), WardenConfig::default());
//!
//!     let owner = Keypair::generate();
//!     let guest = Keypair::generate();
//!
//!     warden
//!         .create_account(&owner, PermissionProfile::new(2, 1, 3, 5))
//!         .await?;
//!     warden
//!         .add_user(&owner, &owner.identity(), guest.identity())
//!         .await?;
//!     warden.accept_invite(&guest, &owner.identity()).await?;
//!
//!     // The owner can never be removed.
//!     let err = warden
//!         .remove_user(&guest, &owner.identity(), owner.identity())
//!         .await
//!         .unwrap_err();
//!     assert_eq!(err.to_string(), "Can't remove the owner");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `warden::core` - Core primitives (Command, Identity, PermissionProfile, etc.)
//! - `warden::registry` - Registries and the directory of accounts
//! - `warden::journal` - Journal abstraction and the in-memory journal

pub mod error;
pub mod warden;

// Re-export component crates
pub use warden_core as core;
pub use warden_journal as journal;
pub use warden_registry as registry;

// Re-export main types for convenience
pub use crate::error::{Result, WardenError};
pub use crate::warden::{SubmitResult, Warden, WardenConfig};

// Re-export commonly used types
pub use warden_core::{Command, CommandBuilder, CommandId, Identity, Keypair, Operation, PermissionProfile};
pub use warden_registry::{MemberRecord, MemberStatus, PermissionPolicy, RegistryError};
