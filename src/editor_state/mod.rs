//! Forking an editor's per-workspace state into a new worktree.
//!
//! VS Code and its forks keep UI state for each opened folder (open editors,
//! layout, panel visibility) in a SQLite file under a directory named by the
//! folder's [workspace identity](compute_identity). A fresh worktree has no such
//! directory, so it opens as a blank window. [`migrate`] copies the main
//! checkout's directory under the worktree's identity and then edits the copy:
//!
//! 1. [`rewrite_paths`]: old folder path to new, in every value
//! 2. [`prune_stale_editors`]: drop editors for files the worktree doesn't have
//! 3. [`clear_terminal_state`] and [`clear_agent_sessions`]: drop window-bound state
//!
//! Each pass opens its own connection and is best-effort.

mod db;
mod identity;
mod layout;
mod migrate;
mod rewrite;
mod storage;
mod transient;

pub use db::{StoredValue, open_state_db};
pub use identity::{
    BirthTimeFingerprint, Fingerprint, compute_identity, compute_identity_with,
    identity_from_parts, platform_fingerprint,
};
#[cfg(unix)]
pub use identity::InodeFingerprint;
pub use layout::{
    EDITOR_MEMENTO_KEY, EDITOR_PART_KEY, EditorGroup, FILE_EDITOR_ID, GridNode, SerializedEditor,
    prune_grid_document, prune_stale_editors, try_prune_stale_editors,
    try_prune_stale_editors_with,
};
pub use migrate::{RewriteStats, STAGING_SUFFIX, SyncResult, migrate, rewrite_db};
pub use rewrite::{rewrite_paths, rewrite_value, try_rewrite_paths};
pub use storage::{
    EditorProduct, POINTER_FILE, STATE_DB, STATE_DB_BACKUP, WorkspaceStorage, state_db_files,
    write_pointer_file,
};
pub use transient::{
    AGENT_KEYS, CHAT_INDEX_KEY, TERMINAL_KEYS, clear_agent_sessions, clear_terminal_state,
    try_clear_agent_sessions, try_clear_terminal_state,
};
