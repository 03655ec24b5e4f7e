//! Git worktree workflows with declarative tmux sessions and forked editor state.
//!
//! forkspace is a CLI tool. The library exposes the pieces the binary is built
//! from so they can be exercised in isolation:
//!
//! - [`tmux`] compiles a window/pane layout into an ordered list of tmux
//!   commands and replays it against a live server.
//! - [`editor_state`] computes the editor's workspace identity for a folder and
//!   forks its per-workspace state database into a new worktree.
//! - [`git`] and [`config`] are the thin collaborators both of those need.
//!
//! The library API is not stable.

pub mod config;
pub mod copy;
pub mod editor_state;
pub mod error;
pub mod git;
pub mod path;
pub mod shell_exec;
pub mod styling;
pub mod tmux;

pub use error::{ForkspaceError, exit_code};
