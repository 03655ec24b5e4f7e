//! Setup commands for a newly created worktree.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use forkspace::config::{CommandConfig, expand_template};
use forkspace::shell_exec::{ShellConfig, run_interactive};
use forkspace::ForkspaceError;
use forkspace::styling::{eprintln, format_with_gutter, progress_message};

use super::format_command_label;

/// Template variables for one worktree.
pub(crate) struct SetupVars<'a> {
    pub repo: &'a str,
    pub branch: &'a str,
    pub worktree_path: &'a Path,
    pub repo_path: &'a Path,
}

/// Run each setup command in `worktree_path`, in declaration order.
///
/// Stops at the first command that fails; its exit code is carried in
/// [`ForkspaceError::SetupCommandFailed`].
pub(crate) fn run_setup(setup: &CommandConfig, vars: &SetupVars<'_>) -> anyhow::Result<()> {
    let worktree_path = vars.worktree_path.to_string_lossy();
    let repo_path = vars.repo_path.to_string_lossy();
    let template_vars = HashMap::from([
        ("repo", vars.repo),
        ("branch", vars.branch),
        ("worktree_path", &*worktree_path),
        ("repo_path", &*repo_path),
    ]);

    for command in setup.commands() {
        let label = format_command_label("setup", command.name.as_deref());
        let template_name = command.name.as_deref().unwrap_or("setup");
        let expanded = expand_template(&command.template, &template_vars, true, template_name)?;

        eprintln!("{}", progress_message(format!("Running {label}")));
        eprintln!("{}", format_with_gutter(&expanded));

        let mut cmd = ShellConfig::get().command(&expanded);
        cmd.current_dir(vars.worktree_path);
        let status = run_interactive(&mut cmd, Some(vars.branch))
            .with_context(|| format!("Failed to start {}", ShellConfig::get().name))?;

        if !status.success() {
            return Err(ForkspaceError::SetupCommandFailed {
                name: command.name.clone(),
                command: expanded,
                exit_code: status.code(),
            }
            .into());
        }
    }
    Ok(())
}
