// ── External commands ──
//
// Reload commands are operator-supplied shell strings run verbatim after
// files are committed. `CommandRunner` is the seam tests replace.

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}: {stderr}", exit_label(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(status: &Option<i32>) -> String {
    status.map_or_else(|| "a signal".to_owned(), |code| format!("status {code}"))
}

/// Captured result of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner {
    /// Run `command`; a non-zero exit is an error.
    fn run(&self, command: &str) -> Result<CommandOutput, ExecError>;
}

/// Runs commands through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, ExecError> {
        debug!(command, "running");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|source| ExecError::Spawn {
                command: command.to_owned(),
                source,
            })?;
        check_output(command, &output)
    }
}

/// Turn a finished process into `CommandOutput`, or `Failed` on non-zero exit.
pub(crate) fn check_output(
    command: &str,
    output: &std::process::Output,
) -> Result<CommandOutput, ExecError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    if output.status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        Err(ExecError::Failed {
            command: command.to_owned(),
            status: output.status.code(),
            stderr,
        })
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = ShellRunner.run("echo reloaded").unwrap();
        assert_eq!(out.stdout.trim(), "reloaded");
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let err = ShellRunner.run("echo nope >&2; exit 3").unwrap_err();
        match err {
            ExecError::Failed { status, stderr, .. } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
