//! In-memory implementation of the Journal trait.
//!
//! Everything is lost when the journal is dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use warden_core::{canonical_bytes, Command, CommandId, Identity};

use crate::error::{JournalError, Result};
use crate::traits::{AppendResult, Journal, JournalEntry};

/// In-memory journal implementation.
///
/// Thread-safe via RwLock.
pub struct MemoryJournal {
    inner: RwLock<MemoryJournalInner>,
}

#[derive(Default)]
struct MemoryJournalInner {
    /// Entries in sequence order; entry `n` has seq `n + 1`.
    entries: Vec<JournalEntry>,

    /// Index: command ID -> seq.
    by_id: HashMap<CommandId, u64>,
}

impl MemoryJournalInner {
    fn entry(&self, seq: u64) -> Option<&JournalEntry> {
        let index = usize::try_from(seq.checked_sub(1)?).ok()?;
        self.entries.get(index)
    }
}

impl MemoryJournal {
    /// Create a new empty journal.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryJournalInner::default()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryJournalInner>> {
        self.inner.read().map_err(|_| JournalError::LockPoisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryJournalInner>> {
        self.inner.write().map_err(|_| JournalError::LockPoisoned)
    }
}

impl Default for MemoryJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Journal for MemoryJournal {
    async fn append(&self, command: &Command, canonical: &[u8]) -> Result<AppendResult> {
        if canonical_bytes(command) != canonical {
            return Err(JournalError::InvalidData(
                "canonical bytes do not match command".into(),
            ));
        }

        let mut inner = self.write()?;
        let id = command.compute_id();

        if let Some(&seq) = inner.by_id.get(&id) {
            return Ok(AppendResult::AlreadyExists { seq });
        }

        let seq = inner.entries.len() as u64 + 1;
        inner.entries.push(JournalEntry {
            seq,
            id,
            command: command.clone(),
            canonical: canonical.to_vec(),
        });
        inner.by_id.insert(id, seq);

        tracing::debug!("journaled command {} at seq {}", id, seq);
        Ok(AppendResult::Appended { seq })
    }

    async fn get(&self, id: &CommandId) -> Result<Option<JournalEntry>> {
        let inner = self.read()?;
        Ok(inner
            .by_id
            .get(id)
            .and_then(|&seq| inner.entry(seq))
            .cloned())
    }

    async fn get_by_seq(&self, seq: u64) -> Result<Option<JournalEntry>> {
        let inner = self.read()?;
        Ok(inner.entry(seq).cloned())
    }

    async fn contains(&self, id: &CommandId) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner.by_id.contains_key(id))
    }

    async fn entries_since(&self, after_seq: u64) -> Result<Vec<JournalEntry>> {
        let inner = self.read()?;
        Ok(inner
            .entries
            .iter()
            .filter(|e| e.seq > after_seq)
            .cloned()
            .collect())
    }

    async fn entries_for_account(&self, account: &Identity) -> Result<Vec<JournalEntry>> {
        let inner = self.read()?;
        Ok(inner
            .entries
            .iter()
            .filter(|e| e.command.account() == account)
            .cloned()
            .collect())
    }

    async fn head_seq(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.entries.len() as u64)
    }
}
