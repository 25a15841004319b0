//! # solprog-cli — Build and Deploy Controller
//!
//! Provides the `solprogctl` command-line interface for the ln_usdt_escrow
//! on-chain program: building the SBF artifact, deploying it with the
//! `solana` CLI, and checking that a program keypair has the expected
//! program identity.
//!
//! ## Commands
//!
//! ```bash
//! solprogctl id
//! solprogctl build
//! solprogctl deploy --rpc-url <url> --payer <keypair.json> \
//!     --program-keypair <keypair.json> [--upgrade-authority <keypair.json>] \
//!     [--so <path>] [--dry-run 0|1]
//! solprogctl keypair-pubkey --program-keypair <keypair.json>
//! ```
//!
//! Successful commands print one JSON object on stdout. Failures print one
//! line on stderr and exit with status 1.
//!
//! ## Crate Policy
//!
//! - Option parsing is separated from command handling.
//! - External tools are reached only through [`runner::ProcessRunner`].

pub mod args;
pub mod config;
pub mod dispatch;
pub mod output;
pub mod runner;

use std::path::{Path, PathBuf};

pub use args::{CommandRequest, OptionValue};
pub use config::ControllerConfig;
pub use dispatch::Dispatcher;
pub use output::{CommandResult, Outcome};
pub use runner::{Invocation, ProcessOutput, ProcessRunner, SystemRunner};

/// Usage text printed by `help`, `--help`, or no command at all.
pub const USAGE: &str = "\
solprogctl (Solana program build/deploy helper)

Commands:
  id
  build
  deploy --rpc-url <url> --payer <keypair.json> --program-keypair <keypair.json> [--upgrade-authority <keypair.json>] [--so <path>] [--dry-run 0|1]
  keypair-pubkey --program-keypair <keypair.json>

Global options (before the command):
  -v, -vv, -vvv      log verbosity (stderr)
  --config <file>    YAML overrides for program location, program id and tools

Notes:
  - Program source: solana/ln_usdt_escrow
  - Default .so output: solana/ln_usdt_escrow/target/deploy/ln_usdt_escrow.so
  - Store keypairs under onchain/ (gitignored). Do NOT commit secrets.";

/// Resolve a path that may be relative to the repository root.
///
/// If the path is absolute, returns it as-is. If relative and the file
/// exists relative to `repo_root`, uses that. Otherwise anchors it to the
/// current directory, so the result names the same file no matter which
/// directory a spawned tool later runs in.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        return repo_relative;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
