//! # External Process Runner
//!
//! Runs the build and deploy tools to completion and captures their output.
//!
//! The dispatcher only sees the [`ProcessRunner`] trait, so tests can record
//! invocations instead of spawning anything. [`SystemRunner`] is the real
//! implementation: it drains stdout and stderr on two reader threads so a
//! chatty stream never blocks the other, and bounds each stream at
//! `max_output_bytes`. A reader that overflows reports at once; the child
//! is killed and the invocation fails without waiting for the other stream.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;

use solprog_core::{ControllerError, ControllerResult};

/// Per-stream capture bound: 50 MiB.
pub const MAX_OUTPUT_BYTES: usize = 50 * 1024 * 1024;

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
        }
    }

    /// Program followed by its arguments.
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Captured output of a successful run, as lossy UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs an [`Invocation`] to completion.
pub trait ProcessRunner {
    /// Fails with `SubprocessFailure` when the program cannot be spawned,
    /// exits non-zero, or overflows the capture bound.
    fn run(&self, invocation: &Invocation) -> ControllerResult<ProcessOutput>;
}

/// Spawns real processes with `std::process`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    max_output_bytes: usize,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::with_limit(MAX_OUTPUT_BYTES)
    }
}

impl SystemRunner {
    pub fn with_limit(max_output_bytes: usize) -> Self {
        Self { max_output_bytes }
    }
}

#[derive(Default)]
struct Captured {
    bytes: Vec<u8>,
    overflowed: bool,
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

fn read_bounded(pipe: Option<impl Read>, limit: usize) -> std::io::Result<Captured> {
    let Some(pipe) = pipe else {
        return Ok(Captured::default());
    };
    let mut bytes = Vec::new();
    pipe.take(limit as u64 + 1).read_to_end(&mut bytes)?;
    let overflowed = bytes.len() > limit;
    bytes.truncate(limit);
    Ok(Captured { bytes, overflowed })
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

type ReaderReport = (Stream, std::io::Result<Captured>);

/// Drain `pipe` on its own thread and report once, at EOF or on overflow.
fn spawn_reader<P>(stream: Stream, pipe: Option<P>, limit: usize, tx: mpsc::Sender<ReaderReport>)
where
    P: Read + Send + 'static,
{
    std::thread::spawn(move || {
        // The receiver is gone once the run has already failed.
        let _ = tx.send((stream, read_bounded(pipe, limit)));
    });
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> ControllerResult<ProcessOutput> {
        let program = invocation.program.clone();
        let failure = |reason: String, stderr: String| ControllerError::SubprocessFailure {
            program: program.clone(),
            reason,
            stderr,
        };

        tracing::info!(
            program = %invocation.program,
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "spawning external tool"
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failure(format!("could not be spawned: {e}"), String::new()))?;

        let limit = self.max_output_bytes;
        let (tx, rx) = mpsc::channel();
        spawn_reader(Stream::Stdout, child.stdout.take(), limit, tx.clone());
        spawn_reader(Stream::Stderr, child.stderr.take(), limit, tx);

        // Readers are detached: a grandchild can hold a pipe open after the
        // child is killed, so an overflow must not wait on the other stream.
        let mut stdout = None;
        let mut stderr: Option<Captured> = None;
        while stdout.is_none() || stderr.is_none() {
            let (stream, captured) = match rx.recv() {
                Ok((stream, Ok(captured))) => (stream, captured),
                Ok((_, Err(e))) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(failure(format!("output could not be read: {e}"), String::new()));
                }
                Err(_) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(failure("output reader panicked".to_string(), String::new()));
                }
            };

            if captured.overflowed {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(
                    program = %invocation.program,
                    ?stream,
                    limit,
                    "output bound exceeded"
                );
                let partial_stderr = match (stream, &stderr) {
                    (Stream::Stderr, _) => captured.text(),
                    (Stream::Stdout, Some(err)) => err.text(),
                    (Stream::Stdout, None) => String::new(),
                };
                return Err(failure(
                    format!("output exceeded {limit} bytes"),
                    partial_stderr.trim().to_string(),
                ));
            }

            match stream {
                Stream::Stdout => stdout = Some(captured),
                Stream::Stderr => stderr = Some(captured),
            }
        }
        let stdout = stdout.unwrap_or_default();
        let stderr = stderr.unwrap_or_default();

        let status = child
            .wait()
            .map_err(|e| failure(format!("could not be awaited: {e}"), String::new()))?;
        tracing::debug!(program = %invocation.program, %status, "external tool finished");

        if !status.success() {
            return Err(failure(
                format!("exited with {status}"),
                stderr.text().trim().to_string(),
            ));
        }

        Ok(ProcessOutput {
            stdout: stdout.text(),
            stderr: stderr.text(),
        })
    }
}
