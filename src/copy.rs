//! Copying files into a fresh worktree and duplicating storage directories.
//!
//! Files are copied with `reflink_or_copy`, so copy-on-write filesystems (APFS,
//! Btrfs, XFS) clone instantly and everything else falls back to a byte copy.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path};

use anyhow::Context;

/// Outcome of [`copy_paths`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopySummary {
    /// Entries copied (a directory counts once)
    pub copied: usize,
    /// Configured paths that do not exist in the source
    pub missing: Vec<String>,
    /// Configured paths rejected for escaping the source root
    pub rejected: Vec<String>,
}

/// Recursively copy `src` into `dest`.
///
/// Skips `.git`, symlinks, and any entry whose file name is in `exclude`.
/// Files already present at the destination are left alone.
pub fn copy_dir_recursive(src: &Path, dest: &Path, exclude: &[&str]) -> anyhow::Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    for entry in fs::read_dir(src).with_context(|| format!("Failed to read {}", src.display()))? {
        let entry = entry?;
        let file_type = entry.file_type()?;

        let file_name = entry.file_name();
        if file_name == ".git" || file_type.is_symlink() {
            continue;
        }
        if exclude.iter().any(|name| file_name == *name) {
            continue;
        }

        let src_path = entry.path();
        let dest_path = dest.join(&file_name);

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dest_path, exclude)?;
        } else {
            copy_file(&src_path, &dest_path)?;
        }
    }

    Ok(())
}

/// Copy repo-relative `paths` (files or directories) from `source_root` to `dest_root`.
///
/// Paths are literal; there is no glob expansion. Missing sources and paths that
/// would escape the root are reported in the summary rather than failing.
pub fn copy_paths(
    source_root: &Path,
    dest_root: &Path,
    paths: &[String],
) -> anyhow::Result<CopySummary> {
    let mut summary = CopySummary::default();

    for relative in paths {
        if !is_contained(Path::new(relative)) {
            log::warn!("Refusing to copy {relative}: path leaves the repository");
            summary.rejected.push(relative.clone());
            continue;
        }

        let src = source_root.join(relative);
        let dest = dest_root.join(relative);
        let metadata = match fs::symlink_metadata(&src) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                summary.missing.push(relative.clone());
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to stat {}", src.display())),
        };

        if metadata.is_dir() {
            copy_dir_recursive(&src, &dest, &[])?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            copy_file(&src, &dest)?;
        }
        log::debug!("Copied {relative}");
        summary.copied += 1;
    }

    Ok(summary)
}

fn copy_file(src: &Path, dest: &Path) -> anyhow::Result<()> {
    if dest.exists() {
        return Ok(());
    }
    match reflink_copy::reflink_or_copy(src, dest) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to copy {}", src.display())),
    }
}

fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
