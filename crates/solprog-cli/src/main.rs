//! # solprogctl entry point
//!
//! clap handles the global envelope (verbosity, config file); everything
//! from the command onward is handed verbatim to the controller's own
//! option parser.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use solprog_cli::{
    CommandRequest, ControllerConfig, Dispatcher, Outcome, SystemRunner, USAGE,
};

/// Solana program build/deploy helper.
#[derive(Parser, Debug)]
#[command(
    name = "solprogctl",
    version,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Enable verbose logging on stderr. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML file overriding program location, program id and tool names.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Command and its options.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // stdout carries the single JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match ControllerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let request = CommandRequest::parse(cli.args);
    let dispatcher = Dispatcher::new(&config, SystemRunner::with_limit(config.max_output_bytes));

    let rendered = dispatcher.dispatch(&request).and_then(|outcome| match outcome {
        Outcome::Help => Ok(USAGE.to_string()),
        Outcome::Result(result) => result.to_pretty_json(),
    });

    match rendered {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}
