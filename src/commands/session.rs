//! tmux session provisioning for `open` and `up`.

use std::path::Path;

use color_print::cformat;
use forkspace::config::ResolvedConfig;
use forkspace::styling::{eprintln, hint_message, info_message, success_message, warning_message};
use forkspace::tmux::{SessionOutcome, SystemTmux, attach_session, provision_session};

use super::context::RepoContext;
use super::print_error;

/// Reuse or create `session` for `working_dir`.
///
/// Failures are returned to the caller, which decides whether they end the
/// workflow.
pub(crate) fn ensure_session(
    config: &ResolvedConfig,
    session: &str,
    working_dir: &Path,
    rollback_on_failure: bool,
) -> anyhow::Result<()> {
    let env = config.env();
    let outcome = provision_session(
        &SystemTmux,
        session,
        working_dir,
        config.windows(),
        &env,
        rollback_on_failure,
    )?;

    match outcome {
        SessionOutcome::Reused => eprintln!(
            "{}",
            info_message(cformat!("Session <bold>{session}</> already running"))
        ),
        SessionOutcome::Created => eprintln!(
            "{}",
            success_message(cformat!("Created session <bold>{session}</>"))
        ),
    }
    Ok(())
}

/// Attach to `session`, or print how to.
pub(crate) fn attach_or_hint(session: &str, attach: bool) -> anyhow::Result<()> {
    if attach {
        return attach_session(session);
    }
    eprintln!(
        "{}",
        hint_message(cformat!(
            "Attach with <bright-black>tmux attach -t ={session}</>"
        ))
    );
    Ok(())
}

/// Report a session failure without ending the workflow.
pub(crate) fn warn_session_failure(session: &str, err: &anyhow::Error) {
    eprintln!(
        "{}",
        warning_message(cformat!("Session <bold>{session}</> was not fully provisioned"))
    );
    print_error(err);
}

pub(crate) fn handle_up(attach: bool, rollback_on_failure: bool) -> anyhow::Result<()> {
    let ctx = RepoContext::current()?;
    let session = ctx.current_session_name()?;
    ensure_session(&ctx.config, &session, &ctx.worktree_root, rollback_on_failure)?;
    attach_or_hint(&session, attach)
}
