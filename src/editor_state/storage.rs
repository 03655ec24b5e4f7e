//! Where the editor keeps per-workspace state.
//!
//! ```text
//! <config dir>/<Product>/User/workspaceStorage/
//!   <identity>/
//!     state.vscdb           SQLite key-value store
//!     state.vscdb.backup    optional copy kept by the editor
//!     workspace.json        {"folder": "file:///..."}
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use etcetera::base_strategy::{BaseStrategy, choose_native_strategy};

use crate::error::ForkspaceError;
use crate::path::file_uri;

/// Primary state database file name.
pub const STATE_DB: &str = "state.vscdb";
/// Backup copy of the state database.
pub const STATE_DB_BACKUP: &str = "state.vscdb.backup";
/// Pointer file naming the folder a storage directory belongs to.
pub const POINTER_FILE: &str = "workspace.json";

/// Editors sharing the workspace storage layout, keyed by launch command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
pub enum EditorProduct {
    #[strum(serialize = "code")]
    Code,
    #[strum(serialize = "code-insiders")]
    CodeInsiders,
    #[strum(serialize = "cursor")]
    Cursor,
    #[strum(serialize = "windsurf")]
    Windsurf,
    #[strum(serialize = "codium")]
    Codium,
}

impl EditorProduct {
    /// Detect the product from an editor command such as `code --new-window`.
    ///
    /// Unknown commands fall back to [`EditorProduct::Code`].
    pub fn from_command(command: &str) -> Self {
        command
            .split_whitespace()
            .next()
            .map(|program| {
                Path::new(program)
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_ascii_lowercase())
                    .unwrap_or_default()
            })
            .and_then(|name| name.parse().ok())
            .unwrap_or(Self::Code)
    }

    /// Directory name under the platform config dir.
    pub fn data_folder(self) -> &'static str {
        match self {
            Self::Code => "Code",
            Self::CodeInsiders => "Code - Insiders",
            Self::Cursor => "Cursor",
            Self::Windsurf => "Windsurf",
            Self::Codium => "VSCodium",
        }
    }
}

/// The `workspaceStorage` root for one editor product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceStorage {
    root: PathBuf,
}

impl WorkspaceStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location for `product` on this platform.
    pub fn for_product(product: EditorProduct) -> anyhow::Result<Self> {
        let strategy =
            choose_native_strategy().map_err(|_| ForkspaceError::StorageLocationUnknown)?;
        // macOS keeps app data under Application Support, not Preferences
        let base = if cfg!(target_os = "macos") {
            strategy.data_dir()
        } else {
            strategy.config_dir()
        };
        Ok(Self::new(
            base.join(product.data_folder())
                .join("User")
                .join("workspaceStorage"),
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage directory for a workspace identity. May not exist.
    pub fn dir_for(&self, identity: &str) -> PathBuf {
        self.root.join(identity)
    }
}

/// Database files present in a storage directory, primary first.
pub fn state_db_files(dir: &Path) -> Vec<PathBuf> {
    [STATE_DB, STATE_DB_BACKUP]
        .into_iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file())
        .collect()
}

/// Write `workspace.json` pointing `dir` at `folder`.
pub fn write_pointer_file(dir: &Path, folder: &Path) -> anyhow::Result<()> {
    let pointer = serde_json::json!({ "folder": file_uri(folder) });
    let path = dir.join(POINTER_FILE);
    std::fs::write(&path, serde_json::to_string(&pointer)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
