//! `forkspace open`: worktree, files, setup, editor state, session, editor.

use std::path::{Path, PathBuf};

use color_print::cformat;
use forkspace::ForkspaceError;
use forkspace::copy::copy_paths;
use forkspace::editor_state::{WorkspaceStorage, compute_identity, migrate};
use forkspace::path::{format_path_for_display, logical_path};
use forkspace::styling::{
    eprintln, info_message, progress_message, success_message, warning_message,
};

use super::context::RepoContext;
use super::editor::launch_editor;
use super::print_error;
use super::session::{attach_or_hint, ensure_session, warn_session_failure};
use super::setup::{SetupVars, run_setup};
use super::state::report_fork;

pub(crate) struct OpenOptions<'a> {
    pub branch: &'a str,
    pub create: bool,
    pub base: Option<&'a str>,
    pub session: bool,
    pub editor: bool,
    pub setup: bool,
    pub fork_state: bool,
    pub attach: bool,
    pub rollback_on_failure: bool,
}

/// Where the worktree came from.
enum WorktreeOrigin {
    Existing(PathBuf),
    Created(PathBuf),
}

impl WorktreeOrigin {
    fn path(&self) -> &Path {
        match self {
            Self::Existing(path) | Self::Created(path) => path,
        }
    }
}

/// Run the open workflow.
///
/// Only locating or creating the worktree is fatal. Later steps report their
/// failures and the workflow carries on, so a broken setup command still
/// leaves a usable session and editor. A failed setup command's exit code is
/// returned at the end.
pub(crate) fn handle_open(opts: OpenOptions<'_>) -> anyhow::Result<()> {
    let ctx = RepoContext::current()?;
    let origin = resolve_worktree(&ctx, &opts)?;
    let worktree_path = origin.path().to_path_buf();
    let mut deferred_error = None;

    if let WorktreeOrigin::Created(_) = origin {
        copy_configured_files(&ctx, &worktree_path);

        if let Some(setup) = ctx.config.setup().filter(|s| !s.is_empty()) {
            if opts.setup {
                let vars = SetupVars {
                    repo: &ctx.repo_name,
                    branch: opts.branch,
                    worktree_path: &worktree_path,
                    repo_path: &ctx.repo_path,
                };
                if let Err(e) = run_setup(setup, &vars) {
                    eprintln!(
                        "{}",
                        warning_message("Setup stopped early, continuing with the session")
                    );
                    deferred_error = Some(e);
                }
            } else {
                eprintln!("{}", info_message("Skipping setup commands (--no-setup)"));
            }
        }

        if opts.fork_state || ctx.config.fork_editor_state() {
            fork_editor_state(&ctx, &worktree_path);
        }
    } else if opts.fork_state {
        eprintln!(
            "{}",
            info_message("Worktree already existed; editor state is only forked on creation")
        );
    }

    let mut running_session = None;
    if opts.session {
        let session = ctx.session_name(opts.branch)?;
        match ensure_session(
            &ctx.config,
            &session,
            &worktree_path,
            opts.rollback_on_failure,
        ) {
            Ok(()) => running_session = Some(session),
            Err(e) => warn_session_failure(&session, &e),
        }
    }

    if opts.editor {
        launch(&ctx, &worktree_path);
    }

    // Attaching blocks until the user detaches, so it goes last
    if let Some(session) = running_session
        && let Err(e) = attach_or_hint(&session, opts.attach)
    {
        print_error(&e);
    }

    deferred_error.map_or(Ok(()), Err)
}

fn resolve_worktree(ctx: &RepoContext, opts: &OpenOptions<'_>) -> anyhow::Result<WorktreeOrigin> {
    if let Some(path) = ctx.repo.worktree_for_branch(opts.branch)? {
        if opts.create {
            eprintln!(
                "{}",
                warning_message(cformat!(
                    "Branch <bold>{}</> already has a worktree, ignoring --create",
                    opts.branch
                ))
            );
        }
        eprintln!(
            "{}",
            info_message(cformat!(
                "Using worktree <bold>{}</>",
                format_path_for_display(&path)
            ))
        );
        return Ok(WorktreeOrigin::Existing(path));
    }

    if opts.create {
        if ctx.repo.local_branch_exists(opts.branch)? {
            anyhow::bail!(
                "Branch {} already exists; drop --create to open it",
                opts.branch
            );
        }
    } else {
        if opts.base.is_some() {
            eprintln!(
                "{}",
                warning_message("--base is only used with --create, ignoring")
            );
        }
        if !ctx.repo.branch_exists(opts.branch)? {
            return Err(ForkspaceError::BranchNotFound {
                branch: opts.branch.to_string(),
            }
            .into());
        }
    }

    let path = ctx
        .config
        .worktree_path(&ctx.repo_name, opts.branch, &ctx.repo_path)?;
    eprintln!(
        "{}",
        progress_message(cformat!("Creating worktree for <bold>{}</>...", opts.branch))
    );
    let base = if opts.create { opts.base } else { None };
    ctx.repo.add_worktree(&path, opts.branch, opts.create, base)?;
    eprintln!(
        "{}",
        success_message(cformat!(
            "Created worktree for <bold>{}</> at <bold>{}</>",
            opts.branch,
            format_path_for_display(&path)
        ))
    );
    Ok(WorktreeOrigin::Created(path))
}

fn copy_configured_files(ctx: &RepoContext, worktree_path: &Path) {
    let paths = ctx.config.copy();
    if paths.is_empty() {
        return;
    }
    match copy_paths(&ctx.repo_path, worktree_path, paths) {
        Ok(summary) => {
            for missing in &summary.missing {
                eprintln!(
                    "{}",
                    warning_message(cformat!("Not copying <bold>{missing}</>: not found"))
                );
            }
            for rejected in &summary.rejected {
                eprintln!(
                    "{}",
                    warning_message(cformat!(
                        "Not copying <bold>{rejected}</>: outside the repository"
                    ))
                );
            }
            if summary.copied > 0 {
                eprintln!(
                    "{}",
                    success_message(format!("Copied {} configured paths", summary.copied))
                );
            }
        }
        Err(e) => {
            eprintln!("{}", warning_message("Copying configured files failed"));
            print_error(&e);
        }
    }
}

/// Fork editor state from the main worktree; failures are warnings.
fn fork_editor_state(ctx: &RepoContext, worktree_path: &Path) {
    let storage = match ctx.config.storage() {
        Ok(storage) => storage,
        Err(e) => {
            print_error(&e);
            return;
        }
    };
    let source = source_folder(&storage, &ctx.repo_path);
    let result = migrate(&storage, &source, worktree_path);
    if let Err(e) = report_fork(&result, worktree_path) {
        eprintln!("{}", warning_message(format!("{e:#}")));
    }
}

/// The main worktree as the editor knows it.
///
/// A checkout reached through a symlink has state under the symlinked path,
/// so that spelling wins when it has state and the resolved one does not.
fn source_folder(storage: &WorkspaceStorage, repo_path: &Path) -> PathBuf {
    let pwd = std::env::var_os("PWD").map(PathBuf::from);
    let logical = logical_path(repo_path, pwd.as_deref());
    let has_state = |folder: &Path| {
        compute_identity(folder).is_ok_and(|id| storage.dir_for(&id).is_dir())
    };
    if logical != repo_path && has_state(&logical) && !has_state(repo_path) {
        log::debug!("Forking editor state from {}", logical.display());
        return logical;
    }
    repo_path.to_path_buf()
}

fn launch(ctx: &RepoContext, worktree_path: &Path) {
    let editor = ctx.config.editor();
    if let Err(e) = launch_editor(editor, worktree_path) {
        eprintln!(
            "{}",
            warning_message(cformat!("Could not launch <bold>{editor}</>"))
        );
        print_error(&e);
    }
}
