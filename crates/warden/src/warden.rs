//! The Warden runtime: unified API over registries and the journal.
//!
//! Every mutation arrives as a signed [`Command`]. The runtime verifies it,
//! applies it to the [`Directory`] and journals it, holding one lock for the
//! whole sequence, so commands are applied in a single total order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use warden_core::{
    canonical_bytes, decode_command, validate_command, validate_command_structure, Command,
    CommandBuilder, CommandId, Identity, Keypair, Operation, PermissionProfile, ValidationError,
};
use warden_journal::{Journal, JournalError};
use warden_registry::{Directory, MemberRecord, PermissionPolicy};

use crate::error::{Result, WardenError};

/// Configuration for the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Whether to verify command signatures on submit.
    pub verify_signatures: bool,
    /// Capability thresholds for every registry.
    pub policy: PermissionPolicy,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            verify_signatures: true,
            policy: PermissionPolicy::default(),
        }
    }
}

impl WardenConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WardenError::Config(e.to_string()))
    }
}

/// Outcome of a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// Command was applied and journaled at `seq`.
    Applied { id: CommandId, seq: u64 },
    /// Command had already been applied at `seq` (idempotent).
    Duplicate { id: CommandId, seq: u64 },
}

impl SubmitResult {
    /// The command ID.
    pub fn id(&self) -> CommandId {
        match self {
            SubmitResult::Applied { id, .. } | SubmitResult::Duplicate { id, .. } => *id,
        }
    }

    /// The journal position of the command.
    pub fn seq(&self) -> u64 {
        match self {
            SubmitResult::Applied { seq, .. } | SubmitResult::Duplicate { seq, .. } => *seq,
        }
    }
}

/// The main Warden struct.
///
/// Provides a unified API for:
/// - Creating accounts
/// - Inviting, accepting, and removing members
/// - Updating member profiles
/// - Querying membership
/// - Replaying the journal
pub struct Warden<J: Journal> {
    /// The applied-command log.
    journal: Arc<J>,
    /// Configuration.
    config: WardenConfig,
    /// All registries. Locked for the full validate-apply-journal sequence.
    directory: Mutex<Directory>,
    /// Nonce source for locally signed commands.
    next_nonce: AtomicU64,
}

impl<J: Journal> Warden<J> {
    /// Create a runtime with an empty directory.
    ///
    /// Use [`Warden::open`] to start from a journal that already holds entries.
    pub fn new(journal: J, config: WardenConfig) -> Self {
        let directory = Directory::with_policy(config.policy.clone());
        Self {
            journal: Arc::new(journal),
            config,
            directory: Mutex::new(directory),
            next_nonce: AtomicU64::new(1),
        }
    }

    /// Create a runtime and rebuild its state from `journal`.
    pub async fn open(journal: J, config: WardenConfig) -> Result<Self> {
        let warden = Self::new(journal, config);
        warden.rebuild().await?;
        Ok(warden)
    }

    /// Get the journal reference.
    pub fn journal(&self) -> &J {
        &self.journal
    }

    /// Get the configuration.
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a signed command.
    ///
    /// A rejected command is not journaled and leaves every registry as it
    /// was. Re-submitting an applied command is a no-op reported as
    /// [`SubmitResult::Duplicate`].
    pub async fn submit(&self, command: &Command) -> Result<SubmitResult> {
        let checked = if self.config.verify_signatures {
            validate_command(command)
        } else {
            validate_command_structure(command)
        };
        if let Err(e) = checked {
            tracing::warn!(
                "invalid {:?} command from {}: {}",
                command.kind(),
                command.author(),
                e
            );
            return Err(e.into());
        }

        let id = command.compute_id();
        let author = *command.author();
        let account = *command.account();

        let mut directory = self.directory.lock().await;

        if let Some(entry) = self.journal.get(&id).await? {
            return Ok(SubmitResult::Duplicate { id, seq: entry.seq });
        }

        let snapshot = directory.snapshot(&account);

        if let Err(e) = directory.apply(author, &account, command.operation()) {
            tracing::warn!(
                "rejected {:?} from {} on account {}: {}",
                command.kind(),
                author,
                account,
                e
            );
            return Err(e.into());
        }

        let canonical = canonical_bytes(command);
        match self.journal.append(command, &canonical).await {
            Ok(appended) => {
                tracing::info!(
                    "applied {:?} from {} on account {} at seq {}",
                    command.kind(),
                    author,
                    account,
                    appended.seq()
                );
                Ok(SubmitResult::Applied {
                    id,
                    seq: appended.seq(),
                })
            }
            Err(e) => {
                directory.restore(account, snapshot);
                Err(e.into())
            }
        }
    }

    /// Build a command from `keypair` against `account` with a fresh nonce.
    ///
    /// After [`Warden::rebuild`] the nonce counter starts above every nonce
    /// in the journal.
    pub fn sign(&self, keypair: &Keypair, account: Identity, operation: Operation) -> Command {
        CommandBuilder::new(keypair.identity(), account, operation)
            .nonce(self.next_nonce.fetch_add(1, Ordering::Relaxed))
            .timestamp(now_millis())
            .sign(keypair)
    }

    async fn sign_and_submit(
        &self,
        keypair: &Keypair,
        account: Identity,
        operation: Operation,
    ) -> Result<SubmitResult> {
        let command = self.sign(keypair, account, operation);
        self.submit(&command).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registry Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an account owned by `keypair`'s identity.
    pub async fn create_account(
        &self,
        keypair: &Keypair,
        profile: PermissionProfile,
    ) -> Result<SubmitResult> {
        self.sign_and_submit(keypair, keypair.identity(), Operation::CreateAccount { profile })
            .await
    }

    /// Invite `target` into `account`.
    pub async fn add_user(
        &self,
        keypair: &Keypair,
        account: &Identity,
        target: Identity,
    ) -> Result<SubmitResult> {
        self.sign_and_submit(keypair, *account, Operation::AddUser { target })
            .await
    }

    /// Accept the invite into `account` addressed to `keypair`'s identity.
    pub async fn accept_invite(
        &self,
        keypair: &Keypair,
        account: &Identity,
    ) -> Result<SubmitResult> {
        self.sign_and_submit(keypair, *account, Operation::AcceptInvite)
            .await
    }

    /// Remove `target` from `account`.
    pub async fn remove_user(
        &self,
        keypair: &Keypair,
        account: &Identity,
        target: Identity,
    ) -> Result<SubmitResult> {
        self.sign_and_submit(keypair, *account, Operation::RemoveUser { target })
            .await
    }

    /// Replace the profile of `target` in `account`.
    pub async fn update_profile(
        &self,
        keypair: &Keypair,
        account: &Identity,
        target: Identity,
        profile: PermissionProfile,
    ) -> Result<SubmitResult> {
        self.sign_and_submit(
            keypair,
            *account,
            Operation::UpdateProfile { target, profile },
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// The record of `identity` in `account`.
    pub async fn member(&self, account: &Identity, identity: &Identity) -> Option<MemberRecord> {
        let directory = self.directory.lock().await;
        directory
            .registry(account)
            .and_then(|r| r.member(identity))
            .cloned()
    }

    /// Every record in `account`, in identity order. Empty if unknown.
    pub async fn members(&self, account: &Identity) -> Vec<MemberRecord> {
        let directory = self.directory.lock().await;
        directory
            .registry(account)
            .map(|r| r.members().cloned().collect())
            .unwrap_or_default()
    }

    /// The owner of `account`, if it exists.
    pub async fn owner(&self, account: &Identity) -> Option<Identity> {
        let directory = self.directory.lock().await;
        directory.registry(account).and_then(|r| r.owner()).copied()
    }

    /// Owners of every account.
    pub async fn accounts(&self) -> Vec<Identity> {
        self.directory.lock().await.accounts()
    }

    /// A copy of the whole directory.
    pub async fn directory(&self) -> Directory {
        self.directory.lock().await.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replay
    // ─────────────────────────────────────────────────────────────────────────

    /// Rebuild every registry by replaying the journal from the start.
    ///
    /// Each entry is decoded from its canonical bytes, which must agree with
    /// the command stored beside them. Journaled commands were verified when
    /// submitted, so only their structure is re-checked. State is swapped in
    /// only if every entry replays cleanly.
    pub async fn rebuild(&self) -> Result<()> {
        let mut directory = self.directory.lock().await;
        let mut fresh = Directory::with_policy(self.config.policy.clone());
        let mut max_nonce: u64 = 0;

        let entries = self.journal.entries_since(0).await?;
        for entry in &entries {
            let command = decode_command(&entry.canonical).map_err(ValidationError::from)?;
            if command != entry.command {
                return Err(JournalError::InvalidData(format!(
                    "entry {} does not match its canonical bytes",
                    entry.seq
                ))
                .into());
            }
            validate_command_structure(&command)?;
            fresh.apply(*command.author(), command.account(), command.operation())?;
            max_nonce = max_nonce.max(command.nonce());
        }
        self.next_nonce
            .fetch_max(max_nonce.saturating_add(1), Ordering::Relaxed);

        tracing::info!(
            "rebuilt {} accounts from {} journal entries",
            fresh.len(),
            entries.len()
        );
        *directory = fresh;
        Ok(())
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
