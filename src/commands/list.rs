use color_print::cformat;
use forkspace::git::Worktree;
use forkspace::path::format_path_for_display;
use forkspace::styling::println;
use forkspace::tmux::{SystemTmux, has_session};

use super::context::RepoContext;

#[derive(serde::Serialize)]
struct ListItem {
    #[serde(flatten)]
    worktree: Worktree,
    current: bool,
    session: Option<String>,
    session_running: bool,
}

pub(crate) fn handle_list(json: bool) -> anyhow::Result<()> {
    let ctx = RepoContext::current()?;
    let mut tmux_available = true;

    let items: Vec<ListItem> = ctx
        .repo
        .list_worktrees()?
        .into_iter()
        .map(|wt| {
            let current = dunce::canonicalize(&wt.path).is_ok_and(|p| p == ctx.worktree_root);
            let session = wt
                .branch
                .as_deref()
                .and_then(|branch| ctx.session_name(branch).ok());
            let session_running = match &session {
                Some(name) if tmux_available => match has_session(&SystemTmux, name) {
                    Ok(running) => running,
                    Err(e) => {
                        log::debug!("Skipping session lookup: {e:#}");
                        tmux_available = false;
                        false
                    }
                },
                _ => false,
            };
            ListItem {
                worktree: wt,
                current,
                session,
                session_running,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for item in &items {
        println!("{}", format_item(item));
    }
    Ok(())
}

fn format_item(item: &ListItem) -> String {
    let wt = &item.worktree;
    let marker = if item.current { "@" } else { " " };
    let name = match &wt.branch {
        Some(branch) => cformat!("<bold>{branch}</>"),
        None => cformat!("<dim>(detached)</>"),
    };
    let mut flags = Vec::new();
    if item.session_running {
        flags.push(cformat!("<green>tmux</>"));
    }
    if wt.locked.is_some() {
        flags.push("locked".to_string());
    }
    if wt.prunable.is_some() {
        flags.push(cformat!("<yellow>prunable</>"));
    }
    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    cformat!(
        "{marker} {name} <dim>{}</> {}{flags}",
        wt.short_head(),
        format_path_for_display(&wt.path)
    )
}
