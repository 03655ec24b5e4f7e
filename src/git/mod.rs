//! Git queries and worktree creation

use std::path::PathBuf;

mod parse;
mod repository;

pub use repository::{Repository, set_base_path};

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    pub head: String,
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: Option<String>,
    pub prunable: Option<String>,
}

impl Worktree {
    /// Short HEAD for display (`abc1234`), empty when unknown.
    pub fn short_head(&self) -> &str {
        &self.head[..self.head.len().min(7)]
    }
}

/// Replace path separators so a branch name can be a single path segment.
///
/// `feature/auth` becomes `feature-auth`.
pub fn sanitize_branch_name(branch: &str) -> String {
    branch.replace(['/', '\\'], "-")
}
