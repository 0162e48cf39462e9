//! External process execution.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::command::LintCommand;
use crate::error::LintError;

/// Output captured from one linter invocation.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// The host seam for running the external linter.
///
/// Tests substitute a scripted implementation; the editor adapter and
/// CLI use [`SystemProcessHost`].
#[async_trait]
pub trait ProcessHost: Send + Sync {
    async fn run(&self, command: &LintCommand) -> Result<ProcessOutput, LintError>;
}

/// Runs lint commands through the platform shell with a bounded runtime,
/// so rapid typing cannot accumulate processes without limit.
#[derive(Debug, Clone)]
pub struct SystemProcessHost {
    timeout: Duration,
}

impl SystemProcessHost {
    /// Default bound on a single linter run.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessHost for SystemProcessHost {
    async fn run(&self, command: &LintCommand) -> Result<ProcessOutput, LintError> {
        let mut cmd = Command::new(command.shell.program());
        cmd.arg(command.shell.command_flag())
            .arg(&command.command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (name, value) in &command.env {
            cmd.env(name, value);
        }
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        debug!("Running linter: {}", command.command_line);
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                LintError::process(format!("linter timed out after {:?}", self.timeout))
            })?
            .map_err(|e| LintError::process(format!("failed to spawn linter: {}", e)))?;

        // scss-lint exits non-zero whenever violations are found; the
        // text output contract is the only signal worth trusting.
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
