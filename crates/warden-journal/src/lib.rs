//! # Warden Journal
//!
//! The append-only log of applied commands. Provides a trait-based
//! interface so the runtime does not care where the log lives.
//!
//! ## Overview
//!
//! The [`Journal`] trait records every command a Warden runtime applied, in
//! apply order. Replaying it from sequence 1 rebuilds the exact registry
//! state. [`MemoryJournal`] is the in-memory implementation.
//!
//! ## Key Types
//!
//! - [`Journal`] - The async trait for all journal operations
//! - [`MemoryJournal`] - In-memory journal
//! - [`AppendResult`] - Result of appending a command
//! - [`JournalEntry`] - One applied command with its sequence number
//!
//! ## Design Notes
//!
//! - **Idempotent appends**: Appending the same command twice returns `AlreadyExists`
//! - **Gap-free sequence**: Entries are numbered 1, 2, 3, ... in apply order

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{JournalError, Result};
pub use memory::MemoryJournal;
pub use traits::{AppendResult, Journal, JournalEntry};
