//! Subprocess execution
//!
//! The [`CommandRunner`] trait is the seam between tool handlers and the
//! operating system; tests substitute a recording fake.

use crate::command::CliCommand;
use crate::error::{PlatformError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Captured output of a finished program
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, absent when killed by a signal
    pub status: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Non-empty stdout and stderr, trimmed and joined by a newline
    pub fn combined(&self) -> String {
        [self.stdout.trim(), self.stderr.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs a command line to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command`; a non-zero exit is an error carrying the captured output
    async fn run(&self, command: &CliCommand) -> Result<CommandOutput>;
}

/// Runner backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
}

impl TokioCommandRunner {
    /// Runner without an upper bound on run time
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill programs still running after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: &CliCommand) -> Result<CommandOutput> {
        let program = command.program().to_string();
        info!(command = %command, "Running platform command");

        let child = Command::new(&program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child).await.map_err(|_| {
                warn!(program = %program, secs = limit.as_secs(), "Command timed out");
                PlatformError::Timeout {
                    program: program.clone(),
                    secs: limit.as_secs(),
                }
            })?,
            None => child.await,
        };

        let output = output.map_err(|source| match source.kind() {
            ErrorKind::NotFound => PlatformError::ProgramNotFound {
                program: program.clone(),
            },
            _ => PlatformError::Io {
                program: program.clone(),
                source,
            },
        })?;

        let captured = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            program = %program,
            status = ?captured.status,
            stdout_bytes = captured.stdout.len(),
            stderr_bytes = captured.stderr.len(),
            "Command finished"
        );

        if output.status.success() {
            Ok(captured)
        } else {
            Err(PlatformError::CommandFailed {
                program,
                status: captured.status,
                stdout: captured.stdout,
                stderr: captured.stderr,
            })
        }
    }
}
