//! # Error Types — Controller Failure Taxonomy
//!
//! Every controller failure is terminal for the invocation: the binary
//! prints the `Display` form to stderr and exits with status 1. There is
//! no retry policy anywhere.
//!
//! ## Design
//!
//! - User errors (`MissingOption`, `UnknownCommand`) are raised before any
//!   file or process I/O.
//! - Keypair errors name the offending file.
//! - Subprocess errors carry the captured stderr of the external tool.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Top-level error type for solprogctl.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// A required `--option` was absent, blank, or given without a value.
    #[error("Missing --{0}")]
    MissingOption(String),

    /// The requested subcommand does not exist.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The keypair file could not be read.
    #[error("Failed to read keypair file {}: {source}", .path.display())]
    KeypairRead {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The keypair file is not a JSON array of byte values.
    #[error("Invalid keypair JSON: {} ({reason})", .path.display())]
    InvalidFormat {
        /// Path of the rejected file.
        path: PathBuf,
        /// What was wrong with the content.
        reason: String,
    },

    /// The byte array does not decode to a valid ed25519 keypair.
    #[error("Invalid keypair material: {} ({reason})", .path.display())]
    InvalidKeyMaterial {
        /// Path of the rejected file.
        path: PathBuf,
        /// Why the bytes were rejected.
        reason: String,
    },

    /// An external build or deploy tool failed to spawn or exited non-zero.
    #[error("{program} {reason}{}", stderr_suffix(.stderr))]
    SubprocessFailure {
        /// Executable name.
        program: String,
        /// Exit status or spawn failure description.
        reason: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// A base58 program identity could not be decoded.
    #[error("invalid program id: {0}")]
    InvalidProgramId(String),

    /// The result could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}
