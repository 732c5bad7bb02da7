//! # Warden Testkit
//!
//! Testing utilities for Warden.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Signing parties and ready-made runtimes for integration tests
//! - **Generators**: Proptest strategies for operation sequences over a small cast
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use warden_testkit::generators::{run_steps, steps};
//!
//! proptest! {
//!     #[test]
//!     fn owner_survives(steps in steps(40)) {
//!         let (registry, _) = run_steps(&steps);
//!         prop_assert!(registry.owner().is_some());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use warden_core::PermissionProfile;
//! use warden_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let command = fixture.create_account(PermissionProfile::new(2, 1, 3, 5));
//! assert_eq!(command.author(), &fixture.identity());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{memory_warden, multi_party_fixtures, TestFixture};
pub use generators::{run_steps, steps, Step, StepOperation};
