//! External process execution.
//!
//! Collaborators (the image copier, the cloud CLI) run as child processes.
//! Arguments marked secret are masked whenever the command line is logged.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Result, TransportError};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0).
    pub success: bool,
    /// Exit code (if available).
    pub exit_code: Option<i32>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Duration of execution.
    pub duration: Duration,
}

impl CommandResult {
    fn from_output(output: &std::process::Output, duration: Duration) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration,
        }
    }
}

/// A command line to run.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<OsString>,
    secret: Vec<bool>,
}

impl CommandSpec {
    /// Creates a command for `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self.secret.push(false);
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, |cmd, arg| cmd.arg(arg))
    }

    /// Appends an argument that must never be logged.
    #[must_use]
    pub fn secret_arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self.secret.push(true);
        self
    }

    /// Returns the program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Renders the command line with secret arguments masked.
    #[must_use]
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for (arg, secret) in self.args.iter().zip(&self.secret) {
            line.push(' ');
            if *secret {
                line.push_str("******");
            } else {
                line.push_str(&arg.to_string_lossy());
            }
        }
        line
    }

    /// Runs the command, capturing its output.
    ///
    /// A non-zero exit is not an error here; see [`CommandSpec::run_checked`].
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Spawn`] if the process cannot be started.
    pub async fn run(&self) -> Result<CommandResult> {
        tracing::debug!(command = %self.display(), "running command");
        let start = Instant::now();

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TransportError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        Ok(CommandResult::from_output(&output, start.elapsed()))
    }

    /// Runs the command and fails on a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Spawn`] or [`TransportError::CommandFailed`].
    pub async fn run_checked(&self) -> Result<CommandResult> {
        let result = self.run().await?;
        if result.success {
            Ok(result)
        } else {
            Err(TransportError::CommandFailed {
                program: self.program.display().to_string(),
                code: result.exit_code,
                stderr: result.stderr,
            })
        }
    }
}
