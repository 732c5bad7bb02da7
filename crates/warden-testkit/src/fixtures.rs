//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use warden::{Warden, WardenConfig};
use warden_core::{Command, CommandBuilder, Identity, Keypair, Operation, PermissionProfile};
use warden_journal::MemoryJournal;

/// Timestamp stamped on every fixture command, so IDs are reproducible.
pub const FIXTURE_TIMESTAMP: i64 = 1_700_000_000_000;

/// A test party: one keypair that signs commands.
pub struct TestFixture {
    pub keypair: Keypair,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// The identity this party acts as.
    pub fn identity(&self) -> Identity {
        self.keypair.identity()
    }

    /// Sign `operation` against `account`.
    pub fn command(&self, account: Identity, operation: Operation, nonce: u64) -> Command {
        CommandBuilder::new(self.identity(), account, operation)
            .nonce(nonce)
            .timestamp(FIXTURE_TIMESTAMP)
            .sign(&self.keypair)
    }

    /// A CreateAccount command for this party's own account.
    pub fn create_account(&self, profile: PermissionProfile) -> Command {
        self.command(self.identity(), Operation::CreateAccount { profile }, 0)
    }

    /// An AddUser command.
    pub fn add_user(&self, account: Identity, target: Identity, nonce: u64) -> Command {
        self.command(account, Operation::AddUser { target }, nonce)
    }

    /// An AcceptInvite command.
    pub fn accept_invite(&self, account: Identity, nonce: u64) -> Command {
        self.command(account, Operation::AcceptInvite, nonce)
    }

    /// A RemoveUser command.
    pub fn remove_user(&self, account: Identity, target: Identity, nonce: u64) -> Command {
        self.command(account, Operation::RemoveUser { target }, nonce)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0xaa; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A runtime over an empty in-memory journal with default configuration.
pub fn memory_warden() -> Warden<MemoryJournal> {
    Warden::new(MemoryJournal::new(), WardenConfig::default())
}
