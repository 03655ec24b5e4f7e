use std::process::Command;

use anyhow::Context;

use super::TmuxCommand;
use crate::error::ForkspaceError;
use crate::shell_exec;

/// Something that can run a single tmux invocation.
///
/// [`SystemTmux`] shells out to the real binary; tests substitute a recorder.
pub trait TmuxRunner {
    /// Run `tmux <args>` and return its stdout.
    fn run(&self, args: &[String]) -> anyhow::Result<String>;
}

/// Runs the `tmux` binary found on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTmux;

impl TmuxRunner for SystemTmux {
    fn run(&self, args: &[String]) -> anyhow::Result<String> {
        let mut cmd = Command::new("tmux");
        cmd.args(args);

        let output = match shell_exec::run(&mut cmd, Some("tmux")) {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ForkspaceError::TmuxNotFound.into());
            }
            Err(e) => return Err(e).context("Failed to spawn tmux"),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                match output.status.code() {
                    Some(code) => format!("exit status {code}"),
                    None => "terminated by signal".to_string(),
                }
            } else {
                stderr
            };
            anyhow::bail!(message);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Run each command in order, stopping at the first failure.
///
/// Commands already executed are not undone; the failing command is reported
/// verbatim in [`ForkspaceError::TmuxCommandFailed`].
pub fn execute_commands(runner: &impl TmuxRunner, commands: &[TmuxCommand]) -> anyhow::Result<()> {
    for cmd in commands {
        if let Err(e) = runner.run(&cmd.argv()) {
            // Missing binary is its own, clearer error
            if let Some(ForkspaceError::TmuxNotFound) = e.downcast_ref::<ForkspaceError>() {
                return Err(e);
            }
            return Err(ForkspaceError::TmuxCommandFailed {
                command: cmd.to_string(),
                error: format!("{e:#}"),
            }
            .into());
        }
    }
    Ok(())
}
