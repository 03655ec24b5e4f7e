use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use anyhow::{Context, bail};
use dunce::canonicalize;

use super::Worktree;
use crate::error::ForkspaceError;
use crate::path::absolute_lexical;
use crate::shell_exec::run;

/// Global base path for repository operations, set by -C flag
static BASE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the global base path for repository operations.
///
/// Called once from main(). Defaults to "." when unset.
pub fn set_base_path(path: PathBuf) {
    BASE_PATH.set(path).ok();
}

fn base_path() -> &'static PathBuf {
    static DEFAULT: OnceLock<PathBuf> = OnceLock::new();
    BASE_PATH
        .get()
        .unwrap_or_else(|| DEFAULT.get_or_init(|| PathBuf::from(".")))
}

/// A git repository, addressed through any path inside one of its worktrees.
///
/// ```no_run
/// use forkspace::git::Repository;
///
/// let repo = Repository::current();
/// let root = repo.worktree_root()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Repository for the current directory, or the `-C` path if one was given.
    pub fn current() -> Self {
        Self::at(base_path().clone())
    }

    /// Root of the worktree containing the base path.
    pub fn worktree_root(&self) -> anyhow::Result<PathBuf> {
        let stdout = self
            .run_command(&["rev-parse", "--show-toplevel"])
            .map_err(|_| self.not_in_repository())?;
        let path = PathBuf::from(stdout.trim());
        canonicalize(&path).context("Failed to canonicalize worktree root")
    }

    /// Path of the main worktree; for a bare repository, the repository itself.
    pub fn repo_path(&self) -> anyhow::Result<PathBuf> {
        let stdout = self
            .run_command(&["rev-parse", "--path-format=absolute", "--git-common-dir"])
            .map_err(|_| self.not_in_repository())?;
        let common_dir = canonicalize(PathBuf::from(stdout.trim()))
            .context("Failed to canonicalize git common dir")?;
        let repo_path = if common_dir.file_name().is_some_and(|n| n == ".git") {
            common_dir.parent().map(Path::to_path_buf).unwrap_or(common_dir)
        } else {
            common_dir
        };
        Ok(repo_path)
    }

    /// Directory name of the main worktree (`app` for `/src/app`).
    ///
    /// A bare repository's `.git` suffix is dropped.
    pub fn repo_name(&self) -> anyhow::Result<String> {
        let repo_path = self.repo_path()?;
        let name = repo_path
            .file_name()
            .context("Repository path has no name")?
            .to_string_lossy();
        Ok(name.strip_suffix(".git").unwrap_or(&name).to_string())
    }

    /// All worktrees with a working tree, main worktree first.
    pub fn list_worktrees(&self) -> anyhow::Result<Vec<Worktree>> {
        let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
        let worktrees = Worktree::parse_porcelain_list(&stdout)?;
        Ok(worktrees.into_iter().filter(|wt| !wt.bare).collect())
    }

    /// Path of the worktree that has `branch` checked out, if any.
    pub fn worktree_for_branch(&self, branch: &str) -> anyhow::Result<Option<PathBuf>> {
        Ok(self
            .list_worktrees()?
            .into_iter()
            .find(|wt| wt.branch.as_deref() == Some(branch))
            .map(|wt| wt.path))
    }

    /// Branch checked out at the base path; `None` when HEAD is detached.
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        let stdout = self.run_command(&["branch", "--show-current"])?;
        let branch = stdout.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }

    pub fn local_branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        Ok(self
            .run_command(&["rev-parse", "--verify", &format!("refs/heads/{branch}")])
            .is_ok())
    }

    /// Whether `branch` exists locally or as `origin/<branch>`.
    pub fn branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        if self.local_branch_exists(branch)? {
            return Ok(true);
        }
        Ok(self
            .run_command(&[
                "rev-parse",
                "--verify",
                &format!("refs/remotes/origin/{branch}"),
            ])
            .is_ok())
    }

    /// Run `git worktree add` for `branch` at `path`.
    ///
    /// With `create`, a new branch is made from `base` (or HEAD). Without it,
    /// git checks out the existing branch, tracking `origin/<branch>` when only
    /// the remote has it.
    pub fn add_worktree(
        &self,
        path: &Path,
        branch: &str,
        create: bool,
        base: Option<&str>,
    ) -> anyhow::Result<()> {
        let path_str = path.to_string_lossy();
        let mut args = vec!["worktree", "add"];
        if create {
            args.extend(["-b", branch, "--", path_str.as_ref()]);
            if let Some(base) = base {
                args.push(base);
            }
        } else {
            args.extend(["--", path_str.as_ref(), branch]);
        }

        self.run_command(&args)
            .map_err(|e| ForkspaceError::WorktreeCreationFailed {
                branch: branch.to_string(),
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    fn not_in_repository(&self) -> ForkspaceError {
        ForkspaceError::NotInRepository {
            path: absolute_lexical(&self.path).unwrap_or_else(|_| self.path.clone()),
        }
    }

    fn logging_context(&self) -> String {
        if self.path.to_str() == Some(".") {
            ".".to_string()
        } else {
            self.path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("?")
                .to_string()
        }
    }

    /// Run a git command in this repository and return its stdout.
    ///
    /// A non-zero exit becomes an error carrying git's stderr (or stdout when
    /// stderr is empty).
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        cmd.current_dir(&self.path);

        let output = run(&mut cmd, Some(&self.logging_context()))
            .with_context(|| format!("Failed to execute: git {}", args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).replace('\r', "\n");
            for line in stderr.trim().lines() {
                log::debug!("  ! {}", line);
            }
            let stdout = String::from_utf8_lossy(&output.stdout);
            let error_msg = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{}", error_msg);
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        for line in stdout.trim().lines() {
            log::debug!("  {}", line);
        }
        Ok(stdout)
    }
}
