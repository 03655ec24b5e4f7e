//! forkspace error types and formatting
//!
//! **`ForkspaceError`** is a typed enum for the domain errors callers branch on.
//! Use `.into()` to convert to `anyhow::Error`; the type survives for
//! `downcast_ref` pattern matching. `Display` produces styled output for users.
//!
//! ```ignore
//! return Err(ForkspaceError::FolderNotFound { path }.into());
//!
//! if let Some(ForkspaceError::TmuxCommandFailed { command, .. }) = err.downcast_ref() {
//!     eprintln!("failed at {command}");
//! }
//! ```

use std::path::PathBuf;

use color_print::cformat;

use crate::path::format_path_for_display;
use crate::styling::{error_message, format_with_gutter, hint_message};

/// Characters that collide with tmux target syntax (`session:window.pane`, `#{format}`).
pub const RESERVED_WINDOW_CHARS: &[char] = &[':', '.', '#'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForkspaceError {
    // Layout configuration
    InvalidWindowName {
        name: String,
    },
    DuplicateWindowName {
        name: String,
    },
    ConfigParse {
        path: PathBuf,
        message: String,
    },

    // Session manager
    TmuxCommandFailed {
        /// The failing command rendered as a `tmux ...` line
        command: String,
        error: String,
    },
    TmuxNotFound,

    // Editor state
    FolderNotFound {
        path: PathBuf,
    },
    SourceStorageMissing {
        folder: PathBuf,
        identity: String,
        storage_dir: PathBuf,
    },
    StorageLocationUnknown,

    // Repository and worktree
    NotInRepository {
        path: PathBuf,
    },
    BranchNotFound {
        branch: String,
    },
    WorktreeCreationFailed {
        branch: String,
        path: PathBuf,
        error: String,
    },
    SetupCommandFailed {
        name: Option<String>,
        command: String,
        exit_code: Option<i32>,
    },
}

impl std::error::Error for ForkspaceError {}

impl std::fmt::Display for ForkspaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForkspaceError::InvalidWindowName { name } if name.is_empty() => {
                write!(f, "{}", error_message("Window name cannot be empty"))
            }

            ForkspaceError::InvalidWindowName { name } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Invalid window name <bold>{name}</>")),
                hint_message("Window names cannot contain ':', '.' or '#'")
            ),

            ForkspaceError::DuplicateWindowName { name } => write!(
                f,
                "{}",
                error_message(cformat!("Window <bold>{name}</> is declared more than once"))
            ),

            ForkspaceError::ConfigParse { path, message } => write!(
                f,
                "{}\n{}",
                error_message(cformat!(
                    "Failed to parse <bold>{}</>",
                    format_path_for_display(path)
                )),
                format_with_gutter(message)
            ),

            ForkspaceError::TmuxCommandFailed { command, error } => {
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("tmux command failed: <bold>{command}</>")),
                    format_with_gutter(error.trim())
                )
            }

            ForkspaceError::TmuxNotFound => write!(
                f,
                "{}\n{}",
                error_message("tmux is not installed or not on PATH"),
                hint_message(cformat!(
                    "Install tmux, or pass <bright-black>--no-session</> to skip the session"
                ))
            ),

            ForkspaceError::FolderNotFound { path } => write!(
                f,
                "{}",
                error_message(cformat!(
                    "Folder <bold>{}</> does not exist",
                    format_path_for_display(path)
                ))
            ),

            ForkspaceError::SourceStorageMissing {
                folder,
                identity,
                storage_dir,
            } => write!(
                f,
                "{}\n{}",
                error_message(cformat!(
                    "No editor state for <bold>{}</> (workspace {identity})",
                    format_path_for_display(folder)
                )),
                hint_message(cformat!(
                    "Expected <bright-black>{}</>; open the folder in the editor once first",
                    format_path_for_display(storage_dir)
                ))
            ),

            ForkspaceError::StorageLocationUnknown => write!(
                f,
                "{}\n{}",
                error_message("Could not determine the editor's workspace storage directory"),
                hint_message(cformat!(
                    "Set <bright-black>editor-storage-dir</> in the user config"
                ))
            ),

            ForkspaceError::NotInRepository { path } => write!(
                f,
                "{}",
                error_message(cformat!(
                    "<bold>{}</> is not inside a git repository",
                    format_path_for_display(path)
                ))
            ),

            ForkspaceError::BranchNotFound { branch } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Branch <bold>{branch}</> not found")),
                hint_message(cformat!(
                    "To create it, run <bright-black>forkspace open --create {branch}</>"
                ))
            ),

            ForkspaceError::WorktreeCreationFailed {
                branch,
                path,
                error,
            } => write!(
                f,
                "{}\n{}",
                error_message(cformat!(
                    "Failed to create worktree for <bold>{branch}</> at <bold>{}</>",
                    format_path_for_display(path)
                )),
                format_with_gutter(error.trim())
            ),

            ForkspaceError::SetupCommandFailed {
                name,
                command,
                exit_code,
            } => {
                let label = match name {
                    Some(name) => cformat!("Setup command <bold>{name}</> failed"),
                    None => "Setup command failed".to_string(),
                };
                let label = match exit_code {
                    Some(code) => format!("{label} (exit code {code})"),
                    None => label,
                };
                write!(f, "{}\n{}", error_message(label), format_with_gutter(command))
            }
        }
    }
}

/// Exit code for an error returned from a command handler.
///
/// A failing setup command propagates its own exit code; everything else is 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ForkspaceError>() {
        Some(ForkspaceError::SetupCommandFailed {
            exit_code: Some(code),
            ..
        }) => *code,
        _ => 1,
    }
}
