use std::path::Path;
use std::process::Command;

use super::{SessionEnv, TmuxRunner, Window, compile, execute_commands};
use crate::error::ForkspaceError;
use crate::shell_exec;

/// Exact-match target for a session or one of its windows.
///
/// The `=` prefix stops tmux from falling back to prefix matching, so session
/// `app` never resolves to an existing `app-old`.
pub fn exact_target(session: &str, window: Option<&str>) -> String {
    match window {
        Some(window) => format!("={session}:{window}"),
        None => format!("={session}"),
    }
}

/// Turn an arbitrary name into one tmux accepts as a session name.
///
/// tmux rewrites `.` and `:` itself, which would make later exact-match
/// lookups miss; doing it up front keeps the name stable.
pub fn sanitize_session_name(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '.' | ':') { '-' } else { c })
        .collect()
}

/// Whether a session named exactly `session` is running.
pub fn has_session(runner: &impl TmuxRunner, session: &str) -> anyhow::Result<bool> {
    let args = ["has-session".to_string(), "-t".to_string(), exact_target(session, None)];
    match runner.run(&args) {
        Ok(_) => Ok(true),
        Err(e) => match e.downcast_ref::<ForkspaceError>() {
            Some(ForkspaceError::TmuxNotFound) => Err(e),
            _ => {
                log::debug!("No session {session}: {e:#}");
                Ok(false)
            }
        },
    }
}

pub fn kill_session(runner: &impl TmuxRunner, session: &str) -> anyhow::Result<()> {
    let args = ["kill-session".to_string(), "-t".to_string(), exact_target(session, None)];
    runner.run(&args)?;
    Ok(())
}

/// What [`provision_session`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A session with this name was already running; nothing was sent.
    Reused,
    Created,
}

/// Create `session` from `windows` unless it is already running.
///
/// With `rollback_on_failure`, a plan that fails after `new-session` succeeded
/// is followed by `kill-session` so no half-built session is left behind. A
/// failing `new-session` is never rolled back: whatever session holds that
/// name was not created here. The original failure is returned either way.
pub fn provision_session(
    runner: &impl TmuxRunner,
    session: &str,
    working_dir: &Path,
    windows: &[Window],
    env: &SessionEnv,
    rollback_on_failure: bool,
) -> anyhow::Result<SessionOutcome> {
    if has_session(runner, session)? {
        log::info!("Reusing tmux session {session}");
        return Ok(SessionOutcome::Reused);
    }

    let plan = compile(session, working_dir, windows, env);
    let Some((create, rest)) = plan.split_first() else {
        return Ok(SessionOutcome::Created);
    };
    execute_commands(runner, std::slice::from_ref(create))?;

    if let Err(e) = execute_commands(runner, rest) {
        if rollback_on_failure
            && !matches!(
                e.downcast_ref::<ForkspaceError>(),
                Some(ForkspaceError::TmuxNotFound)
            )
        {
            log::info!("Rolling back tmux session {session}");
            if let Err(kill_err) = kill_session(runner, session) {
                log::warn!("Failed to kill partial session {session}: {kill_err:#}");
            }
        }
        return Err(e);
    }
    Ok(SessionOutcome::Created)
}

pub fn is_inside_tmux() -> bool {
    std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
}

/// Bring `session` to the foreground.
///
/// Inside tmux this switches the current client; outside it attaches the
/// terminal and blocks until the user detaches.
pub fn attach_session(session: &str) -> anyhow::Result<()> {
    let subcommand = if is_inside_tmux() {
        "switch-client"
    } else {
        "attach-session"
    };
    let mut cmd = Command::new("tmux");
    cmd.args([subcommand, "-t", &exact_target(session, None)]);

    let status = match shell_exec::run_interactive(&mut cmd, Some("tmux")) {
        Ok(status) => status,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ForkspaceError::TmuxNotFound.into());
        }
        Err(e) => return Err(e.into()),
    };
    if !status.success() {
        return Err(ForkspaceError::TmuxCommandFailed {
            command: format!("tmux {subcommand} -t {}", exact_target(session, None)),
            error: match status.code() {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            },
        }
        .into());
    }
    Ok(())
}
