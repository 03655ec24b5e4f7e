use std::path::{Component, Path, PathBuf};

/// Get the user's home directory.
///
/// Uses the `home` crate which handles platform-specific detection:
/// - Unix: `$HOME` environment variable
/// - Windows: `USERPROFILE` or `HOMEDRIVE`/`HOMEPATH`
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Format a filesystem path for user-facing output.
///
/// Replaces home directory prefix with `~` (e.g., `/Users/alex/src/app` -> `~/src/app`).
/// Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}

/// Render a folder path the way the editor's `Uri.fsPath` does.
///
/// Trailing separators are dropped. On Windows the drive letter is lowercased,
/// because the editor normalizes `C:\` to `c:\` before hashing and storing.
pub fn editor_fs_path(path: &Path) -> String {
    let mut rendered = path.to_string_lossy().into_owned();
    while rendered.len() > 1 && (rendered.ends_with('/') || rendered.ends_with('\\')) {
        rendered.pop();
    }
    if cfg!(windows) {
        rendered = lowercase_drive_letter(&rendered);
    }
    rendered
}

fn lowercase_drive_letter(path: &str) -> String {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_uppercase() {
        let mut out = path.to_string();
        out[..1].make_ascii_lowercase();
        return out;
    }
    path.to_string()
}

/// Build a `file://` URI for a local folder.
///
/// Each path segment is percent-encoded and Windows paths gain a leading `/`,
/// so `c:\src\my app` becomes `file:///c%3A/src/my%20app`.
pub fn file_uri(path: &Path) -> String {
    let fs_path = editor_fs_path(path).replace('\\', "/");
    let encoded = fs_path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if encoded.starts_with('/') {
        format!("file://{encoded}")
    } else {
        format!("file:///{encoded}")
    }
}

/// Make `path` absolute without resolving symlinks.
///
/// The editor identifies a folder by the path it was opened with, so symlinks
/// must survive. `.` and `..` components are folded lexically.
pub fn absolute_lexical(path: &Path) -> std::io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Spell `canonical` the way the user's shell reached it.
///
/// git reports symlink-resolved paths, but the editor keys workspace state by
/// the path a folder was opened with. When `cwd` (normally `$PWD`) is
/// `canonical` or somewhere below it, the matching prefix of `cwd` is returned.
/// Anything else yields `canonical` unchanged.
pub fn logical_path(canonical: &Path, cwd: Option<&Path>) -> PathBuf {
    let Some(cwd) = cwd.filter(|cwd| cwd.is_absolute()) else {
        return canonical.to_path_buf();
    };
    let Ok(resolved) = dunce::canonicalize(cwd) else {
        return canonical.to_path_buf();
    };
    let Ok(relative) = resolved.strip_prefix(canonical) else {
        return canonical.to_path_buf();
    };

    let mut logical = cwd.to_path_buf();
    for _ in relative.components() {
        if !logical.pop() {
            return canonical.to_path_buf();
        }
    }
    // A symlink below the root changes the depth; only trust an exact match
    match dunce::canonicalize(&logical) {
        Ok(check) if check == canonical => logical,
        _ => canonical.to_path_buf(),
    }
}
