//! # Command Dispatch
//!
//! Resolves the requested command to its handler. Every handler validates
//! its required options before touching the filesystem or spawning a
//! process, and nothing is carried between invocations.
//!
//! ## Commands
//!
//! - `id` — report the expected program identity. No I/O.
//! - `keypair-pubkey` — derive the identity of `--program-keypair` and
//!   compare it against the expected one.
//! - `build` — always run the build tool.
//! - `deploy` — build if the artifact is missing, then run the deploy tool,
//!   or only report the assembled command under `--dry-run`.

use std::path::{Path, PathBuf};

use solprog_core::{ControllerError, ControllerResult};
use solprog_crypto::load_keypair_file;

use crate::args::CommandRequest;
use crate::config::ControllerConfig;
use crate::output::{CommandResult, Outcome};
use crate::runner::{Invocation, ProcessRunner};

/// Executes one parsed request against a configuration and a runner.
pub struct Dispatcher<'a, R> {
    config: &'a ControllerConfig,
    runner: R,
}

impl<'a, R: ProcessRunner> Dispatcher<'a, R> {
    pub fn new(config: &'a ControllerConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    pub fn dispatch(&self, request: &CommandRequest) -> ControllerResult<Outcome> {
        let command = request.command();
        tracing::debug!(command, options = ?request.options, "dispatching");

        let result = match command {
            // A bare `--help` parses as an option, leaving no command.
            "" | "help" => return Ok(Outcome::Help),
            "id" => self.cmd_id(),
            "keypair-pubkey" => self.cmd_keypair_pubkey(request)?,
            "build" => self.cmd_build()?,
            "deploy" => self.cmd_deploy(request)?,
            other => return Err(ControllerError::UnknownCommand(other.to_string())),
        };
        Ok(Outcome::Result(result))
    }

    fn cmd_id(&self) -> CommandResult {
        CommandResult::ProgramId {
            program_id: self.config.program_id,
        }
    }

    fn cmd_keypair_pubkey(&self, request: &CommandRequest) -> ControllerResult<CommandResult> {
        let program_keypair = request.require("program-keypair")?;
        let keypair = load_keypair_file(&self.resolve(&program_keypair))?;
        let program_id = keypair.pubkey();

        Ok(CommandResult::ProgramKeypair {
            program_keypair,
            program_id,
            matches_default: program_id.matches(&self.config.program_id),
        })
    }

    fn cmd_build(&self) -> ControllerResult<CommandResult> {
        let output = self.runner.run(&self.build_invocation())?;

        Ok(CommandResult::Built {
            program_id: self.config.program_id,
            so_path: self.config.default_so_path.clone(),
            stdout: output.stdout.trim().to_string(),
            stderr: output.stderr.trim().to_string(),
        })
    }

    fn cmd_deploy(&self, request: &CommandRequest) -> ControllerResult<CommandResult> {
        let rpc_url = request.require("rpc-url")?;
        let payer = request.require("payer")?;
        let program_keypair = request.require("program-keypair")?;
        let upgrade_authority = request
            .optional_text("upgrade-authority")
            .unwrap_or_else(|| payer.clone());
        let so_path = request
            .optional_text("so")
            .map(|so| self.resolve(&so))
            .unwrap_or_else(|| self.config.default_so_path.clone());
        let dry_run = request.flag("dry-run");

        let payer_path = self.resolve(&payer);
        let program_keypair_path = self.resolve(&program_keypair);
        let upgrade_authority_path = self.resolve(&upgrade_authority);

        let keypair = load_keypair_file(&program_keypair_path)?;
        let program_id = keypair.pubkey();
        let matches_default = program_id.matches(&self.config.program_id);
        if !matches_default {
            tracing::warn!(
                %program_id,
                expected = %self.config.program_id,
                "program keypair does not match the expected program id"
            );
        }

        if !so_path.exists() {
            tracing::info!(so_path = %so_path.display(), "artifact missing; building first");
            self.runner.run(&self.build_invocation())?;
        }

        let deploy = self.deploy_invocation(DeployTarget {
            so_path: &so_path,
            rpc_url: &rpc_url,
            payer: &payer_path,
            program_keypair: &program_keypair_path,
            upgrade_authority: &upgrade_authority_path,
        });
        tracing::debug!(cmd = ?deploy.command_line(), dry_run, "assembled deploy command");

        if dry_run {
            return Ok(CommandResult::DeployDryRun {
                program_id,
                so_path,
                cmd: deploy.command_line(),
                matches_default,
            });
        }

        let output = self.runner.run(&deploy)?;
        Ok(CommandResult::Deployed {
            program_id,
            so_path,
            matches_default,
            stdout: output.stdout.trim().to_string(),
            stderr: output.stderr.trim().to_string(),
        })
    }

    /// The build tool, run inside the program directory.
    pub fn build_invocation(&self) -> Invocation {
        Invocation::new(
            self.config.build_program.clone(),
            self.config.build_args.clone(),
            self.config.program_dir.clone(),
        )
    }

    /// `solana program deploy ...`, run from the repository root.
    pub fn deploy_invocation(&self, target: DeployTarget<'_>) -> Invocation {
        let args = vec![
            "program".to_string(),
            "deploy".to_string(),
            target.so_path.display().to_string(),
            "--url".to_string(),
            target.rpc_url.to_string(),
            "--keypair".to_string(),
            target.payer.display().to_string(),
            "--program-id".to_string(),
            target.program_keypair.display().to_string(),
            "--upgrade-authority".to_string(),
            target.upgrade_authority.display().to_string(),
        ];
        Invocation::new(
            self.config.deploy_program.clone(),
            args,
            self.config.repo_root.clone(),
        )
    }

    fn resolve(&self, path: &str) -> PathBuf {
        crate::resolve_path(Path::new(path), &self.config.repo_root)
    }
}

/// Inputs to the deploy tool.
#[derive(Debug, Clone, Copy)]
pub struct DeployTarget<'a> {
    pub so_path: &'a Path,
    pub rpc_url: &'a str,
    pub payer: &'a Path,
    pub program_keypair: &'a Path,
    pub upgrade_authority: &'a Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ProcessOutput;

    /// Fails the test if anything is spawned.
    struct NoSpawn;

    impl ProcessRunner for NoSpawn {
        fn run(&self, invocation: &Invocation) -> ControllerResult<ProcessOutput> {
            panic!("unexpected spawn: {:?}", invocation.command_line());
        }
    }

    fn config() -> ControllerConfig {
        ControllerConfig::for_repo(PathBuf::from("/repo")).unwrap()
    }

    fn dispatch(tokens: &[&str]) -> ControllerResult<Outcome> {
        let config = config();
        Dispatcher::new(&config, NoSpawn).dispatch(&CommandRequest::parse(tokens.iter().copied()))
    }

    #[test]
    fn no_command_is_help() {
        assert_eq!(dispatch(&[]).unwrap(), Outcome::Help);
        assert_eq!(dispatch(&["help"]).unwrap(), Outcome::Help);
        assert_eq!(dispatch(&["--help"]).unwrap(), Outcome::Help);
    }

    #[test]
    fn id_reports_configured_program() {
        let outcome = dispatch(&["id"]).unwrap();
        assert_eq!(
            outcome,
            Outcome::Result(CommandResult::ProgramId {
                program_id: config().program_id
            })
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = dispatch(&["foo"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown command: foo");
    }

    #[test]
    fn keypair_pubkey_requires_option() {
        let err = dispatch(&["keypair-pubkey"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing --program-keypair");
    }

    #[test]
    fn deploy_checks_required_options_in_order() {
        let err = dispatch(&["deploy"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing --rpc-url");

        let err = dispatch(&["deploy", "--rpc-url", "http://x"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing --payer");

        let err = dispatch(&["deploy", "--rpc-url", "http://x", "--payer", "p.json"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing --program-keypair");
    }

    #[test]
    fn deploy_flag_without_value_counts_as_missing() {
        let err = dispatch(&["deploy", "--rpc-url", "--payer", "p.json"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing --rpc-url");
    }

    #[test]
    fn deploy_invocation_matches_solana_cli() {
        let config = config();
        let dispatcher = Dispatcher::new(&config, NoSpawn);
        let inv = dispatcher.deploy_invocation(DeployTarget {
            so_path: Path::new("/repo/a.so"),
            rpc_url: "http://localhost:8899",
            payer: Path::new("/keys/payer.json"),
            program_keypair: Path::new("/keys/program.json"),
            upgrade_authority: Path::new("/keys/authority.json"),
        });
        assert_eq!(inv.cwd, PathBuf::from("/repo"));
        assert_eq!(
            inv.command_line(),
            vec![
                "solana",
                "program",
                "deploy",
                "/repo/a.so",
                "--url",
                "http://localhost:8899",
                "--keypair",
                "/keys/payer.json",
                "--program-id",
                "/keys/program.json",
                "--upgrade-authority",
                "/keys/authority.json",
            ]
        );
    }

    #[test]
    fn build_invocation_runs_in_program_dir() {
        let config = config();
        let inv = Dispatcher::new(&config, NoSpawn).build_invocation();
        assert_eq!(inv.command_line(), vec!["cargo", "build-sbf"]);
        assert_eq!(inv.cwd, PathBuf::from("/repo/solana/ln_usdt_escrow"));
    }
}
