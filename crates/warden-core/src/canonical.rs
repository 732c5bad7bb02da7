//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! The same command always produces identical bytes, so its signature and
//! [`CommandId`](crate::CommandId) are stable across platforms.

use ciborium::value::Value;

use crate::command::{Command, CommandHeader, Operation, OperationKind};
use crate::crypto::{Identity, Signature};
use crate::error::CoreError;
use crate::profile::PermissionProfile;

/// Header field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const VERSION: u64 = 0;
    pub const AUTHOR: u64 = 1;
    pub const ACCOUNT: u64 = 2;
    pub const NONCE: u64 = 3;
    pub const TIMESTAMP: u64 = 4;
    pub const KIND: u64 = 5;
    pub const TARGET: u64 = 6;
    pub const PROFILE: u64 = 7;
}

/// Length of the trailing signature.
const SIGNATURE_LEN: usize = 64;

/// Encode a command header to canonical CBOR bytes. This is the signed message.
pub fn canonical_header_bytes(header: &CommandHeader) -> Vec<u8> {
    let value = header_to_cbor_value(header);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

/// Encode an entire command to canonical bytes.
///
/// Format: canonical_header || signature
pub fn canonical_bytes(command: &Command) -> Vec<u8> {
    let mut buf = canonical_header_bytes(&command.header);
    buf.extend_from_slice(&command.signature.0);
    buf
}

/// Convert a header to a CBOR Value (map with integer keys).
fn header_to_cbor_value(header: &CommandHeader) -> Value {
    let operation = &header.operation;

    let target = match operation.target() {
        Some(identity) => Value::Bytes(identity.0.to_vec()),
        None => Value::Null,
    };

    let profile = match operation.profile() {
        Some(profile) => Value::Array(
            profile
                .to_array()
                .iter()
                .map(|level| Value::Integer((*level).into()))
                .collect(),
        ),
        None => Value::Null,
    };

    Value::Map(vec![
        (int(keys::VERSION), Value::Integer(header.version.into())),
        (int(keys::AUTHOR), Value::Bytes(header.author.0.to_vec())),
        (int(keys::ACCOUNT), Value::Bytes(header.account.0.to_vec())),
        (int(keys::NONCE), Value::Integer(header.nonce.into())),
        (int(keys::TIMESTAMP), Value::Integer(header.timestamp.into())),
        (int(keys::KIND), Value::Integer(operation.kind().to_u16().into())),
        (int(keys::TARGET), target),
        (int(keys::PROFILE), profile),
    ])
}

fn int(key: u64) -> Value {
    Value::Integer(key.into())
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item);
            }
        }
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Null => buf.push(0xf6),
        // header_to_cbor_value only builds the variants above
        other => unreachable!("unsupported CBOR value in command header: {:?}", other),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n = i128::from(i);

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

/// Decode a command from canonical bytes.
///
/// Rejects inputs whose header is not in canonical form, so a decoded
/// command always re-encodes to the bytes it came from.
pub fn decode_command(bytes: &[u8]) -> Result<Command, CoreError> {
    if bytes.len() < SIGNATURE_LEN {
        return Err(CoreError::MalformedCommand("too short".into()));
    }

    let value: Value = ciborium::from_reader(std::io::Cursor::new(bytes))
        .map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let header = cbor_value_to_header(&value)?;

    let header_bytes = canonical_header_bytes(&header);
    if !bytes.starts_with(&header_bytes) {
        return Err(CoreError::MalformedCommand("header is not canonical".into()));
    }

    let sig_bytes: [u8; SIGNATURE_LEN] = bytes[header_bytes.len()..]
        .try_into()
        .map_err(|_| CoreError::MalformedCommand("invalid signature length".into()))?;

    Ok(Command {
        header,
        signature: Signature(sig_bytes),
    })
}

/// Convert a CBOR Value (map) back to a CommandHeader.
fn cbor_value_to_header(value: &Value) -> Result<CommandHeader, CoreError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::MalformedCommand("expected map".into())),
    };

    let get = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == key as i128))
            .map(|(_, v)| v)
    };

    let version = decode_uint(get(keys::VERSION), "version")?;
    let version = u8::try_from(version)
        .map_err(|_| CoreError::MalformedCommand(format!("invalid version: {}", version)))?;

    let author = decode_identity(get(keys::AUTHOR), "author")?;
    let account = decode_identity(get(keys::ACCOUNT), "account")?;
    let nonce = decode_uint(get(keys::NONCE), "nonce")?;

    let timestamp = match get(keys::TIMESTAMP) {
        Some(Value::Integer(i)) => i64::try_from(i128::from(*i))
            .map_err(|_| CoreError::MalformedCommand("timestamp out of range".into()))?,
        _ => return Err(CoreError::MalformedCommand("missing timestamp".into())),
    };

    let raw_kind = decode_uint(get(keys::KIND), "kind")?;
    let kind = u16::try_from(raw_kind)
        .ok()
        .and_then(OperationKind::from_u16)
        .ok_or_else(|| CoreError::MalformedCommand(format!("invalid kind: {}", raw_kind)))?;

    let target = match get(keys::TARGET) {
        Some(Value::Null) | None => None,
        other => Some(decode_identity(other, "target")?),
    };

    let profile = match get(keys::PROFILE) {
        Some(Value::Null) | None => None,
        Some(Value::Array(levels)) if levels.len() == 4 => {
            let mut arr = [0u32; 4];
            for (slot, level) in arr.iter_mut().zip(levels) {
                let n = decode_uint(Some(level), "profile level")?;
                *slot = u32::try_from(n)
                    .map_err(|_| CoreError::MalformedCommand("profile level out of range".into()))?;
            }
            Some(PermissionProfile::from_array(arr))
        }
        _ => return Err(CoreError::MalformedCommand("invalid profile".into())),
    };

    let missing = |field: &str| CoreError::MalformedCommand(format!("{:?} requires {}", kind, field));

    let operation = match kind {
        OperationKind::CreateAccount => Operation::CreateAccount {
            profile: profile.ok_or_else(|| missing("profile"))?,
        },
        OperationKind::AddUser => Operation::AddUser {
            target: target.ok_or_else(|| missing("target"))?,
        },
        OperationKind::AcceptInvite => Operation::AcceptInvite,
        OperationKind::RemoveUser => Operation::RemoveUser {
            target: target.ok_or_else(|| missing("target"))?,
        },
        OperationKind::UpdateProfile => Operation::UpdateProfile {
            target: target.ok_or_else(|| missing("target"))?,
            profile: profile.ok_or_else(|| missing("profile"))?,
        },
    };

    Ok(CommandHeader {
        version,
        author,
        account,
        nonce,
        timestamp,
        operation,
    })
}

fn decode_uint(value: Option<&Value>, field: &str) -> Result<u64, CoreError> {
    match value {
        Some(Value::Integer(i)) => u64::try_from(i128::from(*i))
            .map_err(|_| CoreError::MalformedCommand(format!("{} out of range", field))),
        _ => Err(CoreError::MalformedCommand(format!("missing {}", field))),
    }
}

fn decode_identity(value: Option<&Value>, field: &str) -> Result<Identity, CoreError> {
    match value {
        Some(Value::Bytes(b)) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            Ok(Identity(arr))
        }
        _ => Err(CoreError::MalformedCommand(format!("invalid {}", field))),
    }
}
