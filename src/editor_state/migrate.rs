use std::fs;
use std::ops::AddAssign;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use super::identity::compute_identity;
use super::layout::prune_stale_editors;
use super::rewrite::rewrite_paths;
use super::storage::{POINTER_FILE, WorkspaceStorage, state_db_files, write_pointer_file};
use super::transient::{clear_agent_sessions, clear_terminal_state};
use crate::copy::copy_dir_recursive;
use crate::error::ForkspaceError;
use crate::path::{absolute_lexical, editor_fs_path};

/// Suffix of the directory a copy is staged in before it is renamed into place.
pub const STAGING_SUFFIX: &str = ".forkspace-tmp";

/// Rows touched by each rewrite pass, summed over the database files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub paths_rewritten: usize,
    pub editors_pruned: usize,
    pub terminal_keys_cleared: usize,
    pub agent_rows_cleared: usize,
}

impl AddAssign for RewriteStats {
    fn add_assign(&mut self, other: Self) {
        self.paths_rewritten += other.paths_rewritten;
        self.editors_pruned += other.editors_pruned;
        self.terminal_keys_cleared += other.terminal_keys_cleared;
        self.agent_rows_cleared += other.agent_rows_cleared;
    }
}

/// Outcome of [`migrate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub success: bool,
    /// The target already had state; nothing was copied
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub stats: RewriteStats,
}

/// Fork the editor state of `source` into `target`.
///
/// Existing target state is never overwritten. Never fails: a fatal problem
/// (missing folder, no source state, copy error) is reported through
/// [`SyncResult::error`] with `success == false`.
pub fn migrate(storage: &WorkspaceStorage, source: &Path, target: &Path) -> SyncResult {
    let mut result = SyncResult::default();
    match migrate_into(storage, source, target, &mut result) {
        Ok(()) => result.success = true,
        Err(e) => {
            log::debug!("Editor state fork failed: {e:#}");
            // Plain text: the result is serialized for scripts
            result.error = Some(anstream::adapter::strip_str(&format!("{e:#}")).to_string());
        }
    }
    result
}

fn migrate_into(
    storage: &WorkspaceStorage,
    source: &Path,
    target: &Path,
    result: &mut SyncResult,
) -> anyhow::Result<()> {
    let source = absolute_lexical(source)?;
    let target = absolute_lexical(target)?;

    let source_id = compute_identity(&source)?;
    result.source_id = Some(source_id.clone());
    let source_dir = storage.dir_for(&source_id);
    if !source_dir.is_dir() {
        return Err(ForkspaceError::SourceStorageMissing {
            folder: source,
            identity: source_id,
            storage_dir: source_dir,
        }
        .into());
    }

    let target_id = compute_identity(&target)?;
    result.target_id = Some(target_id.clone());
    let target_dir = storage.dir_for(&target_id);
    if target_dir.exists() {
        log::info!("Editor state for {} already exists", target.display());
        result.skipped = true;
        return Ok(());
    }

    let staging = storage
        .root()
        .join(format!("{target_id}{STAGING_SUFFIX}"));
    if staging.exists() {
        log::debug!("Removing stale staging directory {}", staging.display());
        fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to remove {}", staging.display()))?;
    }

    log::info!("Copying editor state {source_id} -> {target_id}");
    copy_dir_recursive(&source_dir, &staging, &[POINTER_FILE])?;
    write_pointer_file(&staging, &target)?;
    fs::rename(&staging, &target_dir).with_context(|| {
        format!(
            "Failed to move {} into place at {}",
            staging.display(),
            target_dir.display()
        )
    })?;

    let old_path = editor_fs_path(&source);
    let new_path = editor_fs_path(&target);
    for db in state_db_files(&target_dir) {
        result.stats += rewrite_db(&db, &old_path, &new_path);
    }

    Ok(())
}

/// Run the three rewrite passes over one database file, in order.
pub fn rewrite_db(db: &Path, old_path: &str, new_path: &str) -> RewriteStats {
    RewriteStats {
        paths_rewritten: rewrite_paths(db, old_path, new_path),
        editors_pruned: prune_stale_editors(db),
        terminal_keys_cleared: clear_terminal_state(db),
        agent_rows_cleared: clear_agent_sessions(db),
    }
}
