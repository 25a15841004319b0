//! # Program Identity
//!
//! A `ProgramId` is the 32-byte ed25519 public key that addresses a keypair
//! or a deployed on-chain program. It is displayed, parsed, and serialized
//! as base58, the encoding every Solana tool uses for addresses.
//!
//! Identity verification is plain equality: a keypair "matches" when its
//! derived public key equals the expected program identity.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ControllerError;

/// Address of the ln_usdt_escrow program this controller deploys.
pub const DEFAULT_PROGRAM_ID: &str = "EmXkcbuyaNWF2TeUcXgetPQ5Rtb9PBxXWSdT4nKaLA6x";

/// A 32-byte public identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId([u8; 32]);

impl ProgramId {
    /// Create an identity from raw public key bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as base58.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parse a base58 address.
    pub fn from_base58(s: &str) -> Result<Self, ControllerError> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|e| ControllerError::InvalidProgramId(format!("{s}: {e}")))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            ControllerError::InvalidProgramId(format!(
                "{s}: expected 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// The compiled-in identity of the escrow program.
    pub fn default_program() -> Result<Self, ControllerError> {
        Self::from_base58(DEFAULT_PROGRAM_ID)
    }

    /// Whether this identity is the `expected` one.
    pub fn matches(&self, expected: &ProgramId) -> bool {
        self == expected
    }
}

impl FromStr for ProgramId {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::fmt::Debug for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProgramId({})", self.to_base58())
    }
}

impl Serialize for ProgramId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for ProgramId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}
