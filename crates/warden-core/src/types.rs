//! Strong type definitions for Warden.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte command identifier, computed as Blake3(canonical_bytes(command)).
///
/// This is the content-address of a command. Submitting the same signed
/// command twice yields the same CommandId, which is how replays are
/// detected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub [u8; 32]);

impl CommandId {
    /// Content-address `canonical`.
    pub fn digest(canonical: &[u8]) -> Self {
        Self(*blake3::hash(canonical).as_bytes())
    }
}

impl fmt::Debug for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandId({})", self)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..8]))
    }
}
