//! # Keypair Files
//!
//! Loads the JSON byte-array keypair format written by `solana-keygen`.
//!
//! ## Validation
//!
//! - Content must be JSON, and the JSON must be an array whose elements are
//!   all integers in `0..=255`. Anything else is `InvalidFormat`.
//! - The array must hold exactly [`KEYPAIR_LENGTH`] bytes and its trailing
//!   public half must be the key derived from the leading seed. Anything
//!   else is `InvalidKeyMaterial`.

use std::path::Path;

use ed25519_dalek::{SigningKey, KEYPAIR_LENGTH as DALEK_KEYPAIR_LENGTH};
use serde_json::Value;

use solprog_core::{ControllerError, ControllerResult, ProgramId};

/// Length of a serialized keypair: 32-byte seed plus 32-byte public key.
pub const KEYPAIR_LENGTH: usize = DALEK_KEYPAIR_LENGTH;

/// An ed25519 keypair loaded from disk.
///
/// Does not implement `Serialize`; only the public identity leaves this type.
pub struct ProgramKeypair {
    signing_key: SigningKey,
}

impl ProgramKeypair {
    /// Decode 64 raw keypair bytes.
    ///
    /// `path` is only used to label errors.
    pub fn from_keypair_bytes(bytes: &[u8], path: &Path) -> ControllerResult<Self> {
        let arr: &[u8; KEYPAIR_LENGTH] =
            bytes.try_into().map_err(|_| ControllerError::InvalidKeyMaterial {
                path: path.to_path_buf(),
                reason: format!("expected {KEYPAIR_LENGTH} bytes, got {}", bytes.len()),
            })?;
        let signing_key =
            SigningKey::from_keypair_bytes(arr).map_err(|e| ControllerError::InvalidKeyMaterial {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Self { signing_key })
    }

    /// The public identity derived from this keypair.
    pub fn pubkey(&self) -> ProgramId {
        ProgramId::from_bytes(self.signing_key.verifying_key().to_bytes())
    }
}

impl std::fmt::Debug for ProgramKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProgramKeypair({})", self.pubkey())
    }
}

/// Read and decode a keypair file.
pub fn load_keypair_file(path: &Path) -> ControllerResult<ProgramKeypair> {
    let raw = std::fs::read_to_string(path).map_err(|source| ControllerError::KeypairRead {
        path: path.to_path_buf(),
        source,
    })?;

    let bytes = parse_byte_array(raw.trim(), path)?;
    let keypair = ProgramKeypair::from_keypair_bytes(&bytes, path)?;
    tracing::debug!(path = %path.display(), pubkey = %keypair.pubkey(), "loaded keypair");
    Ok(keypair)
}

fn parse_byte_array(content: &str, path: &Path) -> ControllerResult<Vec<u8>> {
    let invalid = |reason: String| ControllerError::InvalidFormat {
        path: path.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(invalid("expected array".to_string()));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| invalid(format!("element {i} is not a byte value: {item}")))
        })
        .collect()
}
