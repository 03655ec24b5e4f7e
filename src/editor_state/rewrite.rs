use std::path::Path;

use super::db::{all_text_rows, best_effort, open_state_db, write_value};

/// Replace every reference to `old_path` with `new_path` in every value.
///
/// Returns the number of rows rewritten; failures are logged and count as zero.
pub fn rewrite_paths(db: &Path, old_path: &str, new_path: &str) -> usize {
    best_effort("Path rewrite", db, try_rewrite_paths(db, old_path, new_path))
}

pub fn try_rewrite_paths(db: &Path, old_path: &str, new_path: &str) -> anyhow::Result<usize> {
    if old_path.is_empty() || old_path == new_path {
        return Ok(0);
    }

    let mut conn = open_state_db(db)?;
    let tx = conn.transaction()?;
    let mut rewritten = 0;
    for (key, value) in all_text_rows(&tx)? {
        if let Some(updated) = rewrite_value(value.as_str(), old_path, new_path) {
            write_value(&tx, &key, &value.with_content(updated))?;
            rewritten += 1;
        }
    }
    tx.commit()?;

    log::info!("Rewrote {rewritten} value(s) in {}", db.display());
    Ok(rewritten)
}

/// Rewrite both the plain and the `%2F`-encoded form of `old` in `value`.
///
/// `None` when nothing changed.
pub fn rewrite_value(value: &str, old: &str, new: &str) -> Option<String> {
    let plain = replace_bounded(value, old, new);
    let current = plain.as_deref().unwrap_or(value);
    let encoded = replace_bounded(current, &encode_slashes(old), &encode_slashes(new));
    encoded.or(plain)
}

fn encode_slashes(path: &str) -> String {
    path.replace('/', "%2F")
}

/// Replace `needle` only where it ends a path component.
///
/// `/src/app` matches in `/src/app/main.rs` and `"/src/app"` but not in
/// `/src/app-old`, which is a different folder.
fn replace_bounded(haystack: &str, needle: &str, replacement: &str) -> Option<String> {
    if needle.is_empty() || !haystack.contains(needle) {
        return None;
    }

    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;
    let mut changed = false;
    while let Some(pos) = rest.find(needle) {
        let end = pos + needle.len();
        let at_boundary = rest[end..].chars().next().is_none_or(|c| !continues_name(c));
        out.push_str(&rest[..pos]);
        if at_boundary {
            out.push_str(replacement);
            changed = true;
        } else {
            out.push_str(needle);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);

    changed.then_some(out)
}

fn continues_name(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
