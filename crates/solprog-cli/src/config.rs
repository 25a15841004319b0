//! # Controller Configuration
//!
//! Resolved once in `main` and borrowed immutably by the dispatcher for the
//! rest of the invocation.
//!
//! Defaults locate the program source under `solana/ln_usdt_escrow` of the
//! repository root. An optional YAML file (global `--config`) may override
//! any of them:
//!
//! ```yaml
//! program_dir: solana/ln_usdt_escrow
//! so_path: solana/ln_usdt_escrow/target/deploy/ln_usdt_escrow.so
//! program_id: EmXkcbuyaNWF2TeUcXgetPQ5Rtb9PBxXWSdT4nKaLA6x
//! build_program: cargo
//! build_args: [build-sbf]
//! deploy_program: solana
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use solprog_core::ProgramId;

use crate::runner::MAX_OUTPUT_BYTES;

/// Program source directory, relative to the repository root.
pub const PROGRAM_DIR: &str = "solana/ln_usdt_escrow";

/// Build output, relative to the program directory.
pub const DEFAULT_SO_RELATIVE: &str = "target/deploy/ln_usdt_escrow.so";

/// Everything the dispatcher needs to know about its environment.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Working directory for the deploy tool and base for relative paths.
    pub repo_root: PathBuf,
    /// Working directory for the build tool.
    pub program_dir: PathBuf,
    /// Artifact path used when `--so` is not given.
    pub default_so_path: PathBuf,
    /// Identity the deployed program is expected to have.
    pub program_id: ProgramId,
    /// Build executable.
    pub build_program: String,
    /// Arguments passed to the build executable.
    pub build_args: Vec<String>,
    /// Deploy executable.
    pub deploy_program: String,
    /// Per-stream bound on captured subprocess output.
    pub max_output_bytes: usize,
}

/// On-disk overrides. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub repo_root: Option<PathBuf>,
    #[serde(default)]
    pub program_dir: Option<PathBuf>,
    #[serde(default)]
    pub so_path: Option<PathBuf>,
    #[serde(default)]
    pub program_id: Option<ProgramId>,
    #[serde(default)]
    pub build_program: Option<String>,
    #[serde(default)]
    pub build_args: Option<Vec<String>>,
    #[serde(default)]
    pub deploy_program: Option<String>,
}

impl ControllerConfig {
    /// Defaults for a repository rooted at `repo_root`.
    pub fn for_repo(repo_root: PathBuf) -> Result<Self> {
        let program_dir = repo_root.join(PROGRAM_DIR);
        let default_so_path = program_dir.join(DEFAULT_SO_RELATIVE);
        Ok(Self {
            repo_root,
            program_dir,
            default_so_path,
            program_id: ProgramId::default_program()?,
            build_program: "cargo".to_string(),
            build_args: vec!["build-sbf".to_string()],
            deploy_program: "solana".to_string(),
            max_output_bytes: MAX_OUTPUT_BYTES,
        })
    }

    /// Discover the repository root, then apply the optional config file.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let repo_root = resolve_repo_root().unwrap_or_else(|| {
            tracing::warn!("Could not locate repository root; using current directory");
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });
        tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

        let mut config = Self::for_repo(repo_root)?;
        if let Some(path) = config_path {
            let path = crate::resolve_path(path, &config.repo_root);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file: {}", path.display()))?;
            let file: ConfigFile = serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?;
            config = config.apply(file)?;
        }
        Ok(config)
    }

    /// Layer `file` over these settings.
    ///
    /// Changing `repo_root` or `program_dir` moves the derived paths with
    /// them unless those are overridden too.
    pub fn apply(self, file: ConfigFile) -> Result<Self> {
        let mut config = match file.repo_root {
            Some(root) => Self {
                build_program: self.build_program,
                build_args: self.build_args,
                deploy_program: self.deploy_program,
                ..Self::for_repo(root)?
            },
            None => self,
        };
        if let Some(dir) = file.program_dir {
            config.program_dir = config.repo_root.join(dir);
            config.default_so_path = config.program_dir.join(DEFAULT_SO_RELATIVE);
        }
        if let Some(so) = file.so_path {
            config.default_so_path = config.repo_root.join(so);
        }
        if let Some(id) = file.program_id {
            config.program_id = id;
        }
        if let Some(program) = file.build_program {
            config.build_program = program;
        }
        if let Some(args) = file.build_args {
            config.build_args = args;
        }
        if let Some(program) = file.deploy_program {
            config.deploy_program = program;
        }
        Ok(config)
    }
}

/// Walk up from the current directory to the first directory that contains
/// the program source tree.
fn resolve_repo_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_repo_root(&cwd)
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROGRAM_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_repo_root() {
        let config = ControllerConfig::for_repo(PathBuf::from("/repo")).unwrap();
        assert_eq!(config.program_dir, PathBuf::from("/repo/solana/ln_usdt_escrow"));
        assert_eq!(
            config.default_so_path,
            PathBuf::from("/repo/solana/ln_usdt_escrow/target/deploy/ln_usdt_escrow.so")
        );
        assert_eq!(config.build_program, "cargo");
        assert_eq!(config.build_args, vec!["build-sbf"]);
        assert_eq!(config.deploy_program, "solana");
        assert_eq!(config.max_output_bytes, 50 * 1024 * 1024);
        assert_eq!(config.program_id, ProgramId::default_program().unwrap());
    }

    #[test]
    fn find_repo_root_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(PROGRAM_DIR)).unwrap();
        let nested = dir.path().join("scripts").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn find_repo_root_none_without_program_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_repo_root(dir.path()), None);
    }

    #[test]
    fn yaml_overrides_are_applied() {
        let yaml = r#"
program_dir: programs/escrow
program_id: "11111111111111111111111111111111"
build_program: anchor
build_args: [build]
deploy_program: /opt/solana/bin/solana
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = ControllerConfig::for_repo(PathBuf::from("/repo"))
            .unwrap()
            .apply(file)
            .unwrap();

        assert_eq!(config.program_dir, PathBuf::from("/repo/programs/escrow"));
        assert_eq!(
            config.default_so_path,
            PathBuf::from("/repo/programs/escrow/target/deploy/ln_usdt_escrow.so")
        );
        assert_eq!(config.program_id, ProgramId::from_bytes([0u8; 32]));
        assert_eq!(config.build_program, "anchor");
        assert_eq!(config.build_args, vec!["build"]);
        assert_eq!(config.deploy_program, "/opt/solana/bin/solana");
    }

    #[test]
    fn repo_root_override_moves_derived_paths() {
        let file: ConfigFile = serde_yaml::from_str("repo_root: /elsewhere\n").unwrap();
        let config = ControllerConfig::for_repo(PathBuf::from("/repo"))
            .unwrap()
            .apply(file)
            .unwrap();
        assert_eq!(config.repo_root, PathBuf::from("/elsewhere"));
        assert_eq!(
            config.program_dir,
            PathBuf::from("/elsewhere/solana/ln_usdt_escrow")
        );
    }

    #[test]
    fn explicit_so_path_wins() {
        let file: ConfigFile = serde_yaml::from_str("so_path: out/program.so\n").unwrap();
        let config = ControllerConfig::for_repo(PathBuf::from("/repo"))
            .unwrap()
            .apply(file)
            .unwrap();
        assert_eq!(config.default_so_path, PathBuf::from("/repo/out/program.so"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_yaml::from_str::<ConfigFile>("rpc_url: http://x\n");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_program_id_is_rejected() {
        let result = serde_yaml::from_str::<ConfigFile>("program_id: not-base58-0OIl\n");
        assert!(result.is_err());
    }
}
