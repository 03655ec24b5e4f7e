//! Workspace identities.
//!
//! The editor names each folder's storage directory `md5(fsPath + fingerprint)`,
//! where the fingerprint distinguishes a folder from one later recreated at the
//! same path. Only folders are supported (not multi-root workspace files).

use std::fmt::Write as _;
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use md5::{Digest, Md5};

use crate::error::ForkspaceError;
use crate::path::{absolute_lexical, editor_fs_path};

/// The per-platform component mixed into a workspace identity.
pub trait Fingerprint {
    /// Numeric fingerprint for a folder; `0` means "unavailable".
    fn fingerprint(&self, metadata: &Metadata) -> u64;
}

/// Linux: the inode number.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct InodeFingerprint;

#[cfg(unix)]
impl Fingerprint for InodeFingerprint {
    fn fingerprint(&self, metadata: &Metadata) -> u64 {
        use std::os::unix::fs::MetadataExt;
        metadata.ino()
    }
}

/// macOS and Windows: birth time, truncated to whole milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BirthTimeFingerprint;

impl Fingerprint for BirthTimeFingerprint {
    fn fingerprint(&self, metadata: &Metadata) -> u64 {
        metadata
            .created()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// The fingerprint the editor uses on this platform.
pub fn platform_fingerprint() -> &'static dyn Fingerprint {
    #[cfg(any(target_os = "macos", windows))]
    {
        &BirthTimeFingerprint
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        &InodeFingerprint
    }
}

/// Identity from an already rendered `fsPath` and fingerprint.
pub fn identity_from_parts(fs_path: &str, fingerprint: u64) -> String {
    let mut hasher = Md5::new();
    hasher.update(fs_path.as_bytes());
    if fingerprint != 0 {
        hasher.update(fingerprint.to_string().as_bytes());
    }
    hex_encode(&hasher.finalize())
}

/// Compute the workspace identity the editor assigns to `folder`.
///
/// Returns [`ForkspaceError::FolderNotFound`] when `folder` does not exist.
pub fn compute_identity(folder: &Path) -> anyhow::Result<String> {
    compute_identity_with(folder, platform_fingerprint())
}

pub fn compute_identity_with(
    folder: &Path,
    fingerprint: &dyn Fingerprint,
) -> anyhow::Result<String> {
    let folder = absolute_lexical(folder)?;
    let metadata = match std::fs::metadata(&folder) {
        Ok(metadata) if metadata.is_dir() => metadata,
        _ => {
            return Err(ForkspaceError::FolderNotFound {
                path: folder.clone(),
            }
            .into());
        }
    };
    let fs_path = editor_fs_path(&folder);
    let id = identity_from_parts(&fs_path, fingerprint.fingerprint(&metadata));
    log::debug!("Workspace identity for {fs_path}: {id}");
    Ok(id)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(32), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::linux_inode("/home/user/project", 12345, "e79ca2b0c0607fcd05fd7643f340fb1d")]
    #[case::no_fingerprint("/home/user/project", 0, "90722f2638004be06d790eaac9ac1f8a")]
    #[case::macos_birthtime(
        "/Users/dev/src/app",
        1_700_000_000_123,
        "b41d3f189ced4ea5cd9ee34fc71fcc24"
    )]
    #[case::windows_birthtime(r"c:\src\app", 1_700_000_000_123, "3009e97c0ffe3e37d9a2346da8239b98")]
    fn test_identity_golden(#[case] fs_path: &str, #[case] fingerprint: u64, #[case] expected: &str) {
        assert_eq!(identity_from_parts(fs_path, fingerprint), expected);
    }

    #[test]
    fn test_identity_distinct_inputs() {
        let a = identity_from_parts("/srv/app", 1);
        let b = identity_from_parts("/srv/app", 2);
        let c = identity_from_parts("/srv/app2", 1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_compute_identity_missing_folder() {
        let temp = tempfile::tempdir().unwrap();
        let err = compute_identity(&temp.path().join("gone")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ForkspaceError>(),
            Some(ForkspaceError::FolderNotFound { .. })
        ));
    }

    #[test]
    fn test_compute_identity_is_deterministic() {
        let temp = tempfile::tempdir().unwrap();
        let first = compute_identity(temp.path()).unwrap();
        let second = compute_identity(temp.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_identity_ignores_trailing_separator() {
        let temp = tempfile::tempdir().unwrap();
        let with_slash = format!("{}/", temp.path().display());
        assert_eq!(
            compute_identity(Path::new(&with_slash)).unwrap(),
            compute_identity(temp.path()).unwrap()
        );
    }

    struct Fixed(u64);

    impl Fingerprint for Fixed {
        fn fingerprint(&self, _: &Metadata) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_compute_identity_uses_supplied_fingerprint() {
        let temp = tempfile::tempdir().unwrap();
        let id = compute_identity_with(temp.path(), &Fixed(42)).unwrap();
        let fs_path = editor_fs_path(&absolute_lexical(temp.path()).unwrap());
        assert_eq!(id, identity_from_parts(&fs_path, 42));
    }

    #[test]
    #[cfg(all(unix, not(target_os = "macos")))]
    fn test_linux_uses_inode() {
        use std::os::unix::fs::MetadataExt;
        let temp = tempfile::tempdir().unwrap();
        let ino = std::fs::metadata(temp.path()).unwrap().ino();
        let fs_path = editor_fs_path(&absolute_lexical(temp.path()).unwrap());
        assert_eq!(
            compute_identity(temp.path()).unwrap(),
            identity_from_parts(&fs_path, ino)
        );
    }
}
