//! # Command Results and Output Rendering
//!
//! Each successful invocation prints exactly one pretty-printed JSON object
//! on stdout. The `type` field discriminates the variants.

use std::path::PathBuf;

use serde::Serialize;

use solprog_core::{ControllerResult, ProgramId};

/// Result of a successful controller command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    /// `id`
    ProgramId { program_id: ProgramId },

    /// `keypair-pubkey`
    ProgramKeypair {
        program_keypair: String,
        program_id: ProgramId,
        matches_default: bool,
    },

    /// `build`
    Built {
        program_id: ProgramId,
        so_path: PathBuf,
        stdout: String,
        stderr: String,
    },

    /// `deploy --dry-run`
    DeployDryRun {
        program_id: ProgramId,
        so_path: PathBuf,
        cmd: Vec<String>,
        matches_default: bool,
    },

    /// `deploy`
    Deployed {
        program_id: ProgramId,
        so_path: PathBuf,
        matches_default: bool,
        stdout: String,
        stderr: String,
    },
}

impl CommandResult {
    /// Two-space indented JSON.
    pub fn to_pretty_json(&self) -> ControllerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What the dispatcher hands back to `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print usage text and exit 0.
    Help,
    /// Print the result as JSON and exit 0.
    Result(CommandResult),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_id() -> ProgramId {
        ProgramId::from_bytes([0u8; 32])
    }

    #[test]
    fn program_id_shape() {
        let json = CommandResult::ProgramId {
            program_id: zero_id(),
        }
        .to_pretty_json()
        .unwrap();
        assert_eq!(
            json,
            "{\n  \"type\": \"program_id\",\n  \"program_id\": \"11111111111111111111111111111111\"\n}"
        );
    }

    #[test]
    fn type_tags_are_snake_case() {
        let dry_run = CommandResult::DeployDryRun {
            program_id: zero_id(),
            so_path: PathBuf::from("a.so"),
            cmd: vec!["solana".to_string()],
            matches_default: false,
        };
        let value: serde_json::Value =
            serde_json::from_str(&dry_run.to_pretty_json().unwrap()).unwrap();
        assert_eq!(value["type"], "deploy_dry_run");
        assert_eq!(value["cmd"], serde_json::json!(["solana"]));
        assert_eq!(value["so_path"], "a.so");

        let keypair = CommandResult::ProgramKeypair {
            program_keypair: "kp.json".to_string(),
            program_id: zero_id(),
            matches_default: true,
        };
        let value: serde_json::Value =
            serde_json::from_str(&keypair.to_pretty_json().unwrap()).unwrap();
        assert_eq!(value["type"], "program_keypair");
        assert_eq!(value["matches_default"], true);
    }

    #[test]
    fn deployed_field_order_is_stable() {
        let json = CommandResult::Deployed {
            program_id: zero_id(),
            so_path: PathBuf::from("a.so"),
            matches_default: true,
            stdout: "Program Id: x".to_string(),
            stderr: String::new(),
        }
        .to_pretty_json()
        .unwrap();
        let keys: Vec<&str> = json
            .lines()
            .filter_map(|l| l.trim().strip_prefix('"'))
            .filter_map(|l| l.split('"').next())
            .collect();
        assert_eq!(
            keys,
            vec!["type", "program_id", "so_path", "matches_default", "stdout", "stderr"]
        );
    }
}
