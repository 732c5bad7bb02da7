//! # Warden Core
//!
//! Pure primitives for Warden: identities, permission profiles, and signed
//! commands with their canonical encoding.
//!
//! This crate contains no I/O, no storage, no registry state. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Identity`] - Opaque participant key (an Ed25519 public key)
//! - [`PermissionProfile`] - The four capability levels of a member
//! - [`Command`] - A signed registry operation
//! - [`CommandId`] - Content-addressed identifier (Blake3 hash)
//!
//! ## Canonicalization
//!
//! Commands are encoded using deterministic CBOR. See [`canonical`] module.

pub mod canonical;
pub mod command;
pub mod crypto;
pub mod error;
pub mod profile;
pub mod types;
pub mod validation;

pub use canonical::{canonical_bytes, canonical_header_bytes, decode_command};
pub use command::{Command, CommandBuilder, CommandHeader, Operation, OperationKind};
pub use crypto::{Identity, Keypair, Signature};
pub use error::{CoreError, ValidationError};
pub use profile::PermissionProfile;
pub use types::CommandId;
pub use validation::{validate_command, validate_command_structure};
