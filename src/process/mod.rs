//! External process execution.
//!
//! Every external collaborator (package manager, metadata helper) is reached
//! through the narrow [`ProcessRunner`] capability: run a [`CommandSpec`],
//! get back its captured stdout and exit code. [`SystemRunner`] is the real
//! implementation on top of `tokio::process`; tests substitute fakes.
//!
//! A runner returns `Ok` for any process that ran to completion, including a
//! non-zero exit. `Err` is reserved for processes that could not be started
//! or were killed by the timeout.

pub mod command_builder;

pub use command_builder::CommandSpec;

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::{Result, UpdaterError};

/// Captured result of a completed process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output, byte-for-byte
    pub stdout: Vec<u8>,
    /// Standard error, lossily decoded
    pub stderr: String,
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    /// Output of a process that exited 0 with `stdout`.
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Output of a process that exited with `code` and wrote `stderr`.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into(),
            exit_code: Some(code),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable exit status.
    #[must_use]
    pub fn status(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exited with status {code}"),
            None => "was terminated by a signal".to_string(),
        }
    }

    /// Converts a non-zero exit into [`UpdaterError::UpstreamCommand`].
    ///
    /// # Errors
    ///
    /// Returns the upstream error when the process did not exit 0.
    pub fn check(self, spec: &CommandSpec) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(UpdaterError::UpstreamCommand {
            step: spec.step(),
            command: spec.to_string(),
            exit_code: self.exit_code,
            status: self.status(),
            stderr: self.stderr.trim().to_string(),
        })
    }
}

/// Capability to run an external process and capture its output.
pub trait ProcessRunner {
    /// Runs `spec` to completion.
    ///
    /// # Errors
    ///
    /// Fails only when the process cannot be started or exceeds its timeout.
    fn run(&self, spec: &CommandSpec) -> impl Future<Output = Result<ProcessOutput>> + Send;
}

/// [`ProcessRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        let start = std::time::Instant::now();
        let step = spec.step();

        let mut cmd = Command::new(spec.program());
        cmd.args(spec.get_args());
        if let Some(dir) = spec.get_current_dir() {
            cmd.current_dir(dir);
        }
        cmd.stdin(if spec.get_stdin().is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Dropping the wait future on timeout kills the child
        cmd.kill_on_drop(true);

        tracing::debug!(target: "process", "({}) Executing command: {}", step, spec);

        let mut child = cmd.spawn().map_err(|e| {
            // A missing working directory also surfaces as NotFound
            let dir_ok = spec.get_current_dir().is_none_or(Path::is_dir);
            if e.kind() == std::io::ErrorKind::NotFound && dir_ok {
                UpdaterError::MissingDependency {
                    tool: spec.program().display().to_string(),
                    reason: e.to_string(),
                }
            } else {
                UpdaterError::UpstreamCommand {
                    step: step.clone(),
                    command: spec.to_string(),
                    exit_code: None,
                    status: format!("could not be started: {e}"),
                    stderr: String::new(),
                }
            }
        })?;

        if let (Some(input), Some(mut stdin)) = (spec.get_stdin(), child.stdin.take()) {
            let input = input.to_vec();
            // Written concurrently so a chatty child cannot deadlock on a full stdout pipe
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&input).await {
                    tracing::debug!(target: "process", "Failed to write stdin: {}", e);
                }
            });
        }

        let output_future = child.wait_with_output();
        let waited = if let Some(duration) = spec.timeout() {
            if let Ok(result) = timeout(duration, output_future).await {
                result
            } else {
                tracing::warn!(
                    target: "process",
                    "({}) Command timed out after {:?}: {}",
                    step,
                    duration,
                    spec
                );
                return Err(UpdaterError::UpstreamCommand {
                    step,
                    command: spec.to_string(),
                    exit_code: None,
                    status: format!("timed out after {duration:?}"),
                    stderr: String::new(),
                });
            }
        } else {
            output_future.await
        };
        let output = waited.map_err(|e| UpdaterError::UpstreamCommand {
            step: step.clone(),
            command: spec.to_string(),
            exit_code: None,
            status: format!("could not be awaited: {e}"),
            stderr: String::new(),
        })?;

        let result = ProcessOutput {
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        };

        if !result.stderr.trim().is_empty() {
            tracing::debug!(target: "process", "({}) {}", step, result.stderr.trim());
        }
        tracing::debug!(
            target: "process",
            "({}) Command {} after {}ms, {} bytes on stdout",
            step,
            result.status(),
            start.elapsed().as_millis(),
            result.stdout.len()
        );

        Ok(result)
    }
}
