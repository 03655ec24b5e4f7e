//! State that belongs to the running editor window, not to the folder.
//!
//! Terminal layouts reference processes that don't exist in the new worktree,
//! and external agent sessions are tied to the checkout they were started in.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use super::db::{best_effort, delete_keys, open_state_db, read_value, write_value};

/// Terminal panel keys dropped from a forked store.
pub const TERMINAL_KEYS: &[&str] = &[
    "terminal",
    "terminal.integrated.layoutInfo",
    "terminal.numberOfVisibleViews",
    "workbench.panel.terminal",
    "workbench.panel.terminal.hidden",
];

/// Agent session caches dropped from a forked store.
pub const AGENT_KEYS: &[&str] = &["agentSessions.model.cache", "agentSessions.state.cache"];

/// Chat session index; entries flagged `isExternal` are removed, the rest kept.
pub const CHAT_INDEX_KEY: &str = "chat.ChatSessionStore.index";

pub fn clear_terminal_state(db: &Path) -> usize {
    best_effort("Terminal state clearing", db, try_clear_terminal_state(db))
}

pub fn try_clear_terminal_state(db: &Path) -> anyhow::Result<usize> {
    let conn = open_state_db(db)?;
    let deleted = delete_keys(&conn, TERMINAL_KEYS)?;
    log::debug!("Cleared {deleted} terminal key(s) in {}", db.display());
    Ok(deleted)
}

pub fn clear_agent_sessions(db: &Path) -> usize {
    best_effort("Agent session clearing", db, try_clear_agent_sessions(db))
}

/// Returns deleted cache rows plus one if the chat index was rewritten.
pub fn try_clear_agent_sessions(db: &Path) -> anyhow::Result<usize> {
    let conn = open_state_db(db)?;
    let mut affected = delete_keys(&conn, AGENT_KEYS)?;

    if let Some(value) = read_value(&conn, CHAT_INDEX_KEY)? {
        match drop_external_entries(value.as_str()) {
            Ok(Some(updated)) => {
                write_value(&conn, CHAT_INDEX_KEY, &value.with_content(updated))?;
                affected += 1;
            }
            Ok(None) => {}
            Err(e) => log::debug!("Skipping {CHAT_INDEX_KEY}: {e:#}"),
        }
    }

    log::debug!("Cleared {affected} agent session row(s) in {}", db.display());
    Ok(affected)
}

/// Remove external entries from a chat index document.
///
/// `entries` is a map keyed by session id in current editors and an array in
/// older ones. `None` when nothing was removed.
fn drop_external_entries(raw: &str) -> anyhow::Result<Option<String>> {
    let mut index: Value = serde_json::from_str(raw)?;
    let entries = index.get_mut("entries").context("no entries field")?;

    let (before, after) = match entries {
        Value::Object(map) => {
            let before = map.len();
            map.retain(|_, entry| !is_external(entry));
            (before, map.len())
        }
        Value::Array(list) => {
            let before = list.len();
            list.retain(|entry| !is_external(entry));
            (before, list.len())
        }
        _ => return Ok(None),
    };

    if before == after {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(&index)?))
}

fn is_external(entry: &Value) -> bool {
    entry.get("isExternal").and_then(Value::as_bool) == Some(true)
}
