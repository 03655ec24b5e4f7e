//! Configuration
//!
//! Two files, merged into a [`ResolvedConfig`]:
//!
//! - **User config** (`~/.config/forkspace/config.toml`): where worktrees go,
//!   which editor to launch, how sessions are named.
//! - **Project config** (`<repo>/.config/forkspace.toml`): files to copy, setup
//!   commands, session environment and the window layout.
//!
//! Where both set `editor`, the project wins.

mod commands;
mod expansion;
mod project;
mod user;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use normalize_path::NormalizePath;

pub use commands::{Command, CommandConfig};
pub use expansion::expand_template;
pub use project::ProjectConfig;
pub use user::{
    DEFAULT_EDITOR, DEFAULT_SESSION_NAME, DEFAULT_WORKTREE_PATH, UserConfig, get_config_path,
    set_config_path,
};

use crate::editor_state::{EditorProduct, WorkspaceStorage};
use crate::tmux::{SessionEnv, Window, sanitize_session_name};

/// User and project config for one repository.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub user: UserConfig,
    pub project: Option<ProjectConfig>,
}

impl ResolvedConfig {
    pub fn load(repo_root: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            user: UserConfig::load()?,
            project: ProjectConfig::load(repo_root)?,
        })
    }

    pub fn editor(&self) -> &str {
        self.project
            .as_ref()
            .and_then(|p| p.editor.as_deref())
            .or(self.user.editor.as_deref())
            .unwrap_or(DEFAULT_EDITOR)
    }

    pub fn windows(&self) -> &[Window] {
        self.project.as_ref().map_or(&[], |p| p.windows.as_slice())
    }

    pub fn env(&self) -> SessionEnv {
        self.project
            .as_ref()
            .map(|p| p.env.clone())
            .unwrap_or_default()
    }

    pub fn copy(&self) -> &[String] {
        self.project.as_ref().map_or(&[], |p| p.copy.as_slice())
    }

    pub fn setup(&self) -> Option<&CommandConfig> {
        self.project.as_ref().and_then(|p| p.setup.as_ref())
    }

    pub fn fork_editor_state(&self) -> bool {
        self.project.as_ref().is_some_and(|p| p.fork_editor_state)
    }

    /// Where the worktree for `branch` goes, from the `worktree-path` template.
    ///
    /// Relative results are joined onto `repo_root` and `..` is folded, so the
    /// default `../{{ repo }}.{{ branch | sanitize }}` lands next to the repo.
    pub fn worktree_path(
        &self,
        repo_name: &str,
        branch: &str,
        repo_root: &Path,
    ) -> anyhow::Result<PathBuf> {
        let vars = HashMap::from([("repo", repo_name), ("branch", branch)]);
        let expanded = expand_template(self.user.worktree_path(), &vars, false, "worktree-path")?;
        Ok(repo_root.join(expanded).normalize())
    }

    /// tmux session name for `branch`, safe to use as a target.
    pub fn session_name(&self, repo_name: &str, branch: &str) -> anyhow::Result<String> {
        let vars = HashMap::from([("repo", repo_name), ("branch", branch)]);
        let expanded = expand_template(self.user.session_name(), &vars, false, "session-name")?;
        Ok(sanitize_session_name(&expanded))
    }

    /// Workspace storage root for the configured editor.
    pub fn storage(&self) -> anyhow::Result<WorkspaceStorage> {
        match &self.user.editor_storage_dir {
            Some(dir) => Ok(WorkspaceStorage::new(dir.clone())),
            None => WorkspaceStorage::for_product(EditorProduct::from_command(self.editor())),
        }
    }
}
