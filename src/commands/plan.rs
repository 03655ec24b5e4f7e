use std::path::Path;

use forkspace::styling::println;
use forkspace::tmux::{compile, sanitize_session_name};

use super::context::RepoContext;

/// Print the session plan, one shell-quoted `tmux` line per command.
///
/// The output can be piped to `sh` to build the session by hand.
pub(crate) fn handle_plan(session: Option<&str>, dir: Option<&Path>) -> anyhow::Result<()> {
    let ctx = RepoContext::current()?;
    let session = match session {
        Some(name) => sanitize_session_name(name),
        None => ctx.current_session_name()?,
    };
    let working_dir = dir.unwrap_or(ctx.worktree_root.as_path());

    let env = ctx.config.env();
    for command in compile(&session, working_dir, ctx.config.windows(), &env) {
        println!("{command}");
    }
    Ok(())
}
