//! User-level configuration
//!
//! Personal preferences that apply to every repository, read from
//! `~/.config/forkspace/config.toml` (or `--config` / `FORKSPACE_CONFIG_PATH`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::{Deserialize, Serialize};

use crate::error::ForkspaceError;

pub const DEFAULT_WORKTREE_PATH: &str = "../{{ repo }}.{{ branch | sanitize }}";
pub const DEFAULT_SESSION_NAME: &str = "{{ repo }}-{{ branch | sanitize }}";
pub const DEFAULT_EDITOR: &str = "code";

/// Override for user config path, set via --config CLI flag
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Set the user config path override (called from CLI --config flag)
pub fn set_config_path(path: PathBuf) {
    CONFIG_PATH.set(path).ok();
}

pub fn get_config_path() -> Option<PathBuf> {
    // Priority 1: CLI --config flag
    if let Some(path) = CONFIG_PATH.get() {
        return Some(path.clone());
    }

    // Priority 2: environment variable (also used by tests)
    if let Ok(path) = std::env::var("FORKSPACE_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    // XDG on Linux and macOS, %APPDATA% on Windows
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("forkspace").join("config.toml"))
}

/// User configuration.
///
/// ```toml
/// worktree-path = ".worktrees/{{ branch | sanitize }}"
/// editor = "cursor"
/// session-name = "{{ branch | sanitize }}"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct UserConfig {
    /// Worktree location template, relative to the main worktree.
    /// Variables: `{{ repo }}`, `{{ branch }}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Root of the editor's `workspaceStorage`, for portable installs and tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_storage_dir: Option<PathBuf>,

    /// tmux session name template. Variables: `{{ repo }}`, `{{ branch }}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,

    #[serde(flatten, default, skip_serializing)]
    unknown: HashMap<String, toml::Value>,
}

impl UserConfig {
    /// Load from the resolved config path; defaults when there is no file.
    pub fn load() -> anyhow::Result<Self> {
        match get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("No user config at {}", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents).map_err(|e| ForkspaceError::ConfigParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        let mut unknown: Vec<_> = config.unknown.keys().collect();
        unknown.sort();
        for key in unknown {
            log::warn!("Unknown key {key:?} in {}", path.display());
        }
        Ok(config)
    }

    pub fn worktree_path(&self) -> &str {
        self.worktree_path.as_deref().unwrap_or(DEFAULT_WORKTREE_PATH)
    }

    pub fn session_name(&self) -> &str {
        self.session_name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }
}
