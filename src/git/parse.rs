//! Git output parsing

use std::path::PathBuf;

use anyhow::Context;

use super::Worktree;

impl Worktree {
    pub(crate) fn parse_porcelain_list(output: &str) -> anyhow::Result<Vec<Self>> {
        let mut worktrees = Vec::new();
        let mut current: Option<Worktree> = None;

        for line in output.lines() {
            if line.is_empty() {
                if let Some(wt) = current.take() {
                    worktrees.push(wt);
                }
                continue;
            }

            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, Some(v)),
                None => (line, None),
            };

            if key == "worktree" {
                if let Some(wt) = current.take() {
                    worktrees.push(wt);
                }
                let path = value.context("worktree line missing path")?;
                current = Some(Worktree {
                    path: PathBuf::from(path),
                    head: String::new(),
                    branch: None,
                    bare: false,
                    detached: false,
                    locked: None,
                    prunable: None,
                });
                continue;
            }

            match (key, current.as_mut()) {
                ("HEAD", Some(wt)) => {
                    wt.head = value.context("HEAD line missing SHA")?.to_string();
                }
                ("branch", Some(wt)) => {
                    let branch_ref = value.context("branch line missing ref")?;
                    wt.branch = Some(
                        branch_ref
                            .strip_prefix("refs/heads/")
                            .unwrap_or(branch_ref)
                            .to_string(),
                    );
                }
                ("bare", Some(wt)) => wt.bare = true,
                ("detached", Some(wt)) => wt.detached = true,
                ("locked", Some(wt)) => wt.locked = Some(value.unwrap_or_default().to_string()),
                ("prunable", Some(wt)) => {
                    wt.prunable = Some(value.unwrap_or_default().to_string());
                }
                // Unknown attributes, or attributes before the first worktree
                _ => {}
            }
        }

        if let Some(wt) = current {
            worktrees.push(wt);
        }

        Ok(worktrees)
    }
}
