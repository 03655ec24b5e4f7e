use std::path::PathBuf;

use forkspace::config::ResolvedConfig;
use forkspace::git::Repository;

/// Repository facts and config every workflow starts from.
pub(crate) struct RepoContext {
    pub repo: Repository,
    /// Root of the worktree the command was run in
    pub worktree_root: PathBuf,
    /// Main worktree; worktree paths are computed relative to it
    pub repo_path: PathBuf,
    pub repo_name: String,
    pub config: ResolvedConfig,
}

impl RepoContext {
    /// Resolve from the current directory (or `-C`).
    ///
    /// Project config is read from the main worktree so every worktree of a
    /// repository shares one layout.
    pub fn current() -> anyhow::Result<Self> {
        let repo = Repository::current();
        let worktree_root = repo.worktree_root()?;
        let repo_path = repo.repo_path()?;
        let repo_name = repo.repo_name()?;
        let config = ResolvedConfig::load(&repo_path)?;
        Ok(Self {
            repo,
            worktree_root,
            repo_path,
            repo_name,
            config,
        })
    }

    /// Session name for `branch`.
    pub fn session_name(&self, branch: &str) -> anyhow::Result<String> {
        self.config.session_name(&self.repo_name, branch)
    }

    /// Session name for the worktree the command runs in.
    ///
    /// A detached HEAD falls back to the worktree's directory name.
    pub fn current_session_name(&self) -> anyhow::Result<String> {
        match self.repo.current_branch()? {
            Some(branch) => self.session_name(&branch),
            None => {
                let dir_name = self
                    .worktree_root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.repo_name.clone());
                self.session_name(&dir_name)
            }
        }
    }
}
