//! Access to the editor's `ItemTable` key-value store.
//!
//! Values are stored as TEXT by some editor versions and BLOB by others; a
//! rewritten value keeps the storage class it was read with.

use std::path::Path;

use anyhow::Context;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags, OptionalExtension, ToSql, params};

/// A value read from `ItemTable`, tagged with its SQLite storage class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    Text(String),
    Blob(Vec<u8>),
}

impl StoredValue {
    /// `None` for NULL, numeric, or non-UTF-8 values, which are never edited.
    pub fn from_ref(value: ValueRef<'_>) -> Option<Self> {
        match value {
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .ok()
                .map(|s| Self::Text(s.to_string())),
            ValueRef::Blob(bytes) => std::str::from_utf8(bytes)
                .ok()
                .map(|_| Self::Blob(bytes.to_vec())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) => s,
            // Checked as UTF-8 in from_ref
            Self::Blob(bytes) => std::str::from_utf8(bytes).unwrap_or_default(),
        }
    }

    /// Same storage class, new content.
    pub fn with_content(&self, content: String) -> Self {
        match self {
            Self::Text(_) => Self::Text(content),
            Self::Blob(_) => Self::Blob(content.into_bytes()),
        }
    }
}

impl ToSql for StoredValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(s) => ToSqlOutput::from(s.as_str()),
            Self::Blob(bytes) => ToSqlOutput::from(bytes.as_slice()),
        })
    }
}

/// Open an existing state database for reading and writing.
///
/// Never creates a file: a missing database is an error, not an empty store.
pub fn open_state_db(path: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open {}", path.display()))?;
    conn.busy_timeout(std::time::Duration::from_secs(2))?;
    Ok(conn)
}

pub fn read_value(conn: &Connection, key: &str) -> anyhow::Result<Option<StoredValue>> {
    let value = conn
        .query_row(
            "SELECT value FROM ItemTable WHERE key = ?1",
            params![key],
            |row| Ok(StoredValue::from_ref(row.get_ref(0)?)),
        )
        .optional()?;
    Ok(value.flatten())
}

pub fn write_value(conn: &Connection, key: &str, value: &StoredValue) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE ItemTable SET value = ?1 WHERE key = ?2",
        params![value, key],
    )?;
    Ok(())
}

/// Delete `keys`, returning the number of rows removed.
pub fn delete_keys(conn: &Connection, keys: &[&str]) -> anyhow::Result<usize> {
    let mut stmt = conn.prepare("DELETE FROM ItemTable WHERE key = ?1")?;
    let mut deleted = 0;
    for key in keys {
        deleted += stmt.execute(params![key])?;
    }
    Ok(deleted)
}

/// Every `(key, value)` row whose value is editable text.
pub fn all_text_rows(conn: &Connection) -> anyhow::Result<Vec<(String, StoredValue)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM ItemTable")?;
    let rows = stmt.query_map([], |row| {
        let key: String = row.get(0)?;
        Ok(StoredValue::from_ref(row.get_ref(1)?).map(|value| (key, value)))
    })?;

    let mut out = Vec::new();
    for row in rows {
        if let Some(pair) = row? {
            out.push(pair);
        }
    }
    Ok(out)
}

/// Run a rewrite pass, turning failure into a warning and a zero count.
pub(crate) fn best_effort(pass: &str, db: &Path, result: anyhow::Result<usize>) -> usize {
    match result {
        Ok(count) => count,
        Err(e) => {
            log::warn!("{pass} skipped for {}: {e:#}", db.display());
            0
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A state database in a temp dir with the editor's schema.
    pub(crate) fn state_db(rows: &[(&str, StoredValue)]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.vscdb");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB)",
        )
        .unwrap();
        for (key, value) in rows {
            conn.execute(
                "INSERT INTO ItemTable (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .unwrap();
        }
        (dir, path)
    }

    pub(crate) fn text(s: &str) -> StoredValue {
        StoredValue::Text(s.to_string())
    }

    pub(crate) fn blob(s: &str) -> StoredValue {
        StoredValue::Blob(s.as_bytes().to_vec())
    }

    pub(crate) fn value_type(path: &Path, key: &str) -> String {
        let conn = Connection::open(path).unwrap();
        conn.query_row(
            "SELECT typeof(value) FROM ItemTable WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_read_write_preserves_storage_class() {
        let (_dir, path) = state_db(&[("a", text("one")), ("b", blob("two"))]);
        let conn = open_state_db(&path).unwrap();

        let a = read_value(&conn, "a").unwrap().unwrap();
        let b = read_value(&conn, "b").unwrap().unwrap();
        assert_eq!(a.as_str(), "one");
        assert_eq!(b.as_str(), "two");

        write_value(&conn, "a", &a.with_content("uno".into())).unwrap();
        write_value(&conn, "b", &b.with_content("dos".into())).unwrap();
        drop(conn);

        assert_eq!(value_type(&path, "a"), "text");
        assert_eq!(value_type(&path, "b"), "blob");
    }

    #[test]
    fn test_read_missing_key() {
        let (_dir, path) = state_db(&[]);
        let conn = open_state_db(&path).unwrap();
        assert_eq!(read_value(&conn, "nope").unwrap(), None);
    }

    #[test]
    fn test_open_does_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.vscdb");
        assert!(open_state_db(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_keys_counts_rows() {
        let (_dir, path) = state_db(&[("a", text("1")), ("b", text("2"))]);
        let conn = open_state_db(&path).unwrap();
        assert_eq!(delete_keys(&conn, &["a", "missing"]).unwrap(), 1);
        assert_eq!(all_text_rows(&conn).unwrap().len(), 1);
    }
}
