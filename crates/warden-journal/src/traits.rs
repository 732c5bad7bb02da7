//! Journal trait: the abstract interface for the applied-command log.
//!
//! The journal is the serialized transaction log of a Warden runtime. Only
//! commands that were applied successfully are appended, in apply order,
//! so replaying it from the start reproduces the registry state.

use async_trait::async_trait;
use warden_core::{Command, CommandId, Identity};

use crate::error::Result;

/// Result of appending a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendResult {
    /// Command was appended at this sequence number.
    Appended { seq: u64 },
    /// Command already exists (idempotent - not an error).
    AlreadyExists { seq: u64 },
}

impl AppendResult {
    /// The sequence number the command occupies.
    pub fn seq(&self) -> u64 {
        match self {
            AppendResult::Appended { seq } | AppendResult::AlreadyExists { seq } => *seq,
        }
    }
}

/// One applied command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Position in the journal (1-indexed, gap-free).
    pub seq: u64,
    /// Content address of the command.
    pub id: CommandId,
    /// The command itself.
    pub command: Command,
    /// Canonical bytes as submitted. Replay decodes these.
    pub canonical: Vec<u8>,
}

/// The Journal trait: async interface for the applied-command log.
///
/// # Design Notes
///
/// - **Idempotent appends**: appending the same command twice returns
///   `AlreadyExists` with the original sequence number.
/// - **Total order**: sequence numbers start at 1 and never skip.
#[async_trait]
pub trait Journal: Send + Sync {
    /// Append a command.
    ///
    /// # Arguments
    /// - `command`: The applied command.
    /// - `canonical`: Its canonical bytes.
    async fn append(&self, command: &Command, canonical: &[u8]) -> Result<AppendResult>;

    /// Get an entry by command ID.
    async fn get(&self, id: &CommandId) -> Result<Option<JournalEntry>>;

    /// Get an entry by sequence number.
    async fn get_by_seq(&self, seq: u64) -> Result<Option<JournalEntry>>;

    /// Check if a command has been journaled.
    async fn contains(&self, id: &CommandId) -> Result<bool>;

    /// Entries with `seq > after_seq`, in order.
    async fn entries_since(&self, after_seq: u64) -> Result<Vec<JournalEntry>>;

    /// Entries that targeted `account`, in order.
    async fn entries_for_account(&self, account: &Identity) -> Result<Vec<JournalEntry>>;

    /// Sequence number of the last entry (0 when empty).
    async fn head_seq(&self) -> Result<u64>;
}
