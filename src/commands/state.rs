//! `forkspace state` subcommands

use std::path::Path;

use anyhow::bail;
use color_print::cformat;
use forkspace::config::{ResolvedConfig, UserConfig};
use forkspace::editor_state::{SyncResult, WorkspaceStorage, compute_identity, migrate};
use forkspace::path::format_path_for_display;
use forkspace::styling::{
    eprintln, format_with_gutter, info_message, println, success_message,
};

pub(crate) fn handle_state_id(folder: &Path) -> anyhow::Result<()> {
    println!("{}", compute_identity(folder)?);
    Ok(())
}

/// Fork workspace state and print the [`SyncResult`] as JSON on stdout.
pub(crate) fn handle_state_fork(
    source: &Path,
    target: &Path,
    storage_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let storage = match storage_dir {
        Some(dir) => WorkspaceStorage::new(dir),
        None => ResolvedConfig {
            user: UserConfig::load()?,
            project: None,
        }
        .storage()?,
    };

    let result = migrate(&storage, source, target);
    println!("{}", serde_json::to_string_pretty(&result)?);
    report_fork(&result, target)
}

/// Status line for a fork; an unsuccessful fork becomes an error.
pub(crate) fn report_fork(result: &SyncResult, target: &Path) -> anyhow::Result<()> {
    let target = format_path_for_display(target);
    match result {
        SyncResult {
            success: true,
            skipped: true,
            ..
        } => eprintln!(
            "{}",
            info_message(cformat!("<bold>{target}</> already has editor state"))
        ),
        SyncResult { success: true, .. } => eprintln!(
            "{}",
            success_message(cformat!(
                "Forked editor state into <bold>{target}</> <dim>({} paths, {} editors pruned)</>",
                result.stats.paths_rewritten,
                result.stats.editors_pruned
            ))
        ),
        SyncResult { error, .. } => {
            bail!(
                "Failed to fork editor state\n{}",
                format_with_gutter(error.as_deref().unwrap_or("unknown error"))
            )
        }
    }
    Ok(())
}
