//! The editor's serialized grid of editor groups.
//!
//! The grid is a tree: branches split space between children, leaves are
//! editor groups. Each group lists its open editors plus a few fields that
//! point into that list by position (`mru`, `preview`, `sticky`). Removing an
//! editor means renumbering all of them.
//!
//! ```json
//! {"serializedGrid": {"root": {"type": "branch", "data": [
//!   {"type": "leaf", "size": 800, "data": {
//!     "id": 1,
//!     "editors": [{"id": "workbench.editors.files.fileEditorInput", "value": "{...}"}],
//!     "mru": [0], "preview": 0, "sticky": 0}}]}}}
//! ```
//!
//! Fields this module doesn't interpret are carried through untouched.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::db::{StoredValue, best_effort, open_state_db, read_value, write_value};

/// Flat key holding the grid document.
pub const EDITOR_PART_KEY: &str = "editorpart.state";
/// Memento key whose `editorpart.state` field holds the grid document.
pub const EDITOR_MEMENTO_KEY: &str = "memento/workbench.parts.editor";
/// Editor type id for plain file editors; the only kind that is inspected.
pub const FILE_EDITOR_ID: &str = "workbench.editors.files.fileEditorInput";

/// A node of the grid tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GridNode {
    Branch {
        data: Vec<GridNode>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Leaf {
        data: EditorGroup,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

/// One editor group (a leaf of the grid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorGroup {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(default)]
    pub editors: Vec<SerializedEditor>,
    /// Editor indices, most recently used first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mru: Option<Vec<usize>>,
    /// Index of the preview (italic) editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<usize>,
    /// Number of pinned editors at the front of `editors`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedEditor {
    pub id: String,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SerializedEditor {
    /// Local path of a file editor, if this is one and its value parses.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.id != FILE_EDITOR_ID {
            return None;
        }
        let inner: Value = serde_json::from_str(self.value.as_str()?).ok()?;
        let resource = inner.get("resourceJSON")?;
        match resource.get("scheme").and_then(Value::as_str) {
            None | Some("file") => {}
            Some(_) => return None,
        }
        resource
            .get("fsPath")
            .or_else(|| resource.get("path"))
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }
}

impl GridNode {
    /// Drop file editors whose path fails `exists`, recursing through branches.
    ///
    /// Returns the number of editors removed.
    pub fn prune(&mut self, exists: &dyn Fn(&Path) -> bool) -> usize {
        match self {
            Self::Branch { data, .. } => data.iter_mut().map(|child| child.prune(exists)).sum(),
            Self::Leaf { data, .. } => data.prune(exists),
        }
    }
}

impl EditorGroup {
    pub fn prune(&mut self, exists: &dyn Fn(&Path) -> bool) -> usize {
        let kept: Vec<usize> = self
            .editors
            .iter()
            .enumerate()
            .filter(|(_, editor)| editor.file_path().is_none_or(|path| exists(&path)))
            .map(|(i, _)| i)
            .collect();

        let removed = self.editors.len() - kept.len();
        if removed == 0 {
            return 0;
        }

        let mut remap = vec![None; self.editors.len()];
        for (new, &old) in kept.iter().enumerate() {
            remap[old] = Some(new);
        }

        let editors = std::mem::take(&mut self.editors);
        self.editors = editors
            .into_iter()
            .enumerate()
            .filter_map(|(i, editor)| remap[i].map(|_| editor))
            .collect();

        let len = self.editors.len();
        if let Some(mru) = &mut self.mru {
            let mut next: Vec<usize> = Vec::with_capacity(len);
            for new in mru.iter().filter_map(|&old| remap.get(old).copied().flatten()) {
                if !next.contains(&new) {
                    next.push(new);
                }
            }
            // Indices the old list never mentioned go last
            for i in 0..len {
                if !next.contains(&i) {
                    next.push(i);
                }
            }
            *mru = next;
        }
        self.preview = self.preview.and_then(|p| remap.get(p).copied().flatten());
        self.sticky = self
            .sticky
            .map(|k| kept.iter().filter(|&&i| i < k).count());

        removed
    }
}

/// Prune the tree at `serializedGrid.root` of a grid document.
///
/// Returns the editors removed; `doc` is only modified when that is non-zero.
pub fn prune_grid_document(doc: &mut Value, exists: &dyn Fn(&Path) -> bool) -> anyhow::Result<usize> {
    let root = doc
        .pointer_mut("/serializedGrid/root")
        .context("no serializedGrid.root")?;
    let mut tree: GridNode = serde_json::from_value(root.clone())?;
    let removed = tree.prune(exists);
    if removed > 0 {
        *root = serde_json::to_value(&tree)?;
    }
    Ok(removed)
}

/// Remove editors for files that no longer exist from both grid locations.
///
/// Failures are logged and count as zero.
pub fn prune_stale_editors(db: &Path) -> usize {
    best_effort("Editor pruning", db, try_prune_stale_editors(db))
}

pub fn try_prune_stale_editors(db: &Path) -> anyhow::Result<usize> {
    try_prune_stale_editors_with(db, &|path: &Path| path.exists())
}

pub fn try_prune_stale_editors_with(
    db: &Path,
    exists: &dyn Fn(&Path) -> bool,
) -> anyhow::Result<usize> {
    let conn = open_state_db(db)?;
    let mut removed = 0;

    if let Some(value) = read_value(&conn, EDITOR_PART_KEY)? {
        match prune_flat(value.as_str(), exists) {
            Ok(Some((count, updated))) => {
                write_value(&conn, EDITOR_PART_KEY, &value.with_content(updated))?;
                removed += count;
            }
            Ok(None) => {}
            Err(e) => log::debug!("Skipping {EDITOR_PART_KEY}: {e:#}"),
        }
    }

    if let Some(value) = read_value(&conn, EDITOR_MEMENTO_KEY)? {
        match prune_memento(&value, exists) {
            Ok(Some((count, updated))) => {
                write_value(&conn, EDITOR_MEMENTO_KEY, &updated)?;
                removed += count;
            }
            Ok(None) => {}
            Err(e) => log::debug!("Skipping {EDITOR_MEMENTO_KEY}: {e:#}"),
        }
    }

    if removed > 0 {
        log::info!("Pruned {removed} stale editor(s) in {}", db.display());
    }
    Ok(removed)
}

fn prune_flat(
    raw: &str,
    exists: &dyn Fn(&Path) -> bool,
) -> anyhow::Result<Option<(usize, String)>> {
    let mut doc: Value = serde_json::from_str(raw)?;
    let removed = prune_grid_document(&mut doc, exists)?;
    if removed == 0 {
        return Ok(None);
    }
    Ok(Some((removed, serde_json::to_string(&doc)?)))
}

/// The memento stores the grid document either as an object or as a JSON string.
fn prune_memento(
    value: &StoredValue,
    exists: &dyn Fn(&Path) -> bool,
) -> anyhow::Result<Option<(usize, StoredValue)>> {
    let mut memento: Value = serde_json::from_str(value.as_str())?;
    let Some(inner) = memento.get_mut(EDITOR_PART_KEY) else {
        return Ok(None);
    };

    let removed = match inner {
        Value::String(encoded) => match prune_flat(encoded, exists)? {
            Some((count, updated)) => {
                *encoded = updated;
                count
            }
            None => 0,
        },
        Value::Object(_) => prune_grid_document(inner, exists)?,
        _ => return Ok(None),
    };

    if removed == 0 {
        return Ok(None);
    }
    Ok(Some((
        removed,
        value.with_content(serde_json::to_string(&memento)?),
    )))
}
