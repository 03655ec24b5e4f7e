//! Project-level configuration
//!
//! Checked into the repository at `<repo>/.config/forkspace.toml` and shared
//! by everyone working on the project.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::commands::CommandConfig;
use crate::error::ForkspaceError;
use crate::tmux::{SessionEnv, Window, validate_windows};

/// Project configuration.
///
/// ```toml
/// copy = [".env", "config/master.key"]
/// fork-editor-state = true
///
/// [setup]
/// install = "npm ci"
/// db = "createdb {{ repo }}_{{ branch | sanitize }}"
///
/// [env]
/// PORT = 3001
///
/// [[windows]]
/// name = "dev"
/// panes = [{ command = "npm run dev" }, { command = "npm test -- --watch" }]
/// ```
///
/// Setup commands can use `{{ repo }}`, `{{ branch }}`, `{{ worktree_path }}`
/// and `{{ repo_path }}`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    /// Repo-relative files or directories copied into new worktrees
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copy: Vec<String>,

    /// Commands run once, in order, in a newly created worktree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<CommandConfig>,

    /// Session environment; numbers and booleans are stringified
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "deserialize_env"
    )]
    pub env: SessionEnv,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<Window>,

    /// Editor command, overriding the user config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    #[serde(default, rename = "fork-editor-state")]
    pub fork_editor_state: bool,

    /// Captures unknown fields for validation warnings
    #[serde(flatten, default, skip_serializing)]
    unknown: HashMap<String, toml::Value>,
}

impl ProjectConfig {
    pub fn path(repo_root: &Path) -> PathBuf {
        repo_root.join(".config").join("forkspace.toml")
    }

    /// Load `.config/forkspace.toml` from `repo_root`; `None` when absent.
    ///
    /// Window names are validated here so a bad layout fails before any tmux
    /// command runs.
    pub fn load(repo_root: &Path) -> anyhow::Result<Option<Self>> {
        let config_path = Self::path(repo_root);
        if !config_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config = Self::parse(&contents, &config_path)?;
        for key in config.unknown_keys() {
            log::warn!("Unknown key {key:?} in {}", config_path.display());
        }
        Ok(Some(config))
    }

    pub fn parse(contents: &str, path: &Path) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| ForkspaceError::ConfigParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        validate_windows(&config.windows)?;
        Ok(config)
    }

    /// Unrecognized top-level keys, sorted.
    pub fn unknown_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.unknown.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn deserialize_env<'de, D>(deserializer: D) -> Result<SessionEnv, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EnvValue {
        String(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }

    let raw = IndexMap::<String, EnvValue>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                EnvValue::String(s) => s,
                EnvValue::Integer(n) => n.to_string(),
                EnvValue::Float(n) => n.to_string(),
                EnvValue::Bool(b) => b.to_string(),
            };
            (key, value)
        })
        .collect())
}
