//! Terminal output styling.
//!
//! ## stdout vs stderr principle
//!
//! - **stdout**: Primary data output (`plan` lines, `state id`, `list`)
//! - **stderr**: Status messages (progress, success, errors, hints, warnings)
//!
//! This keeps `forkspace plan | sh` and `forkspace state id . | pbcopy`
//! usable. Use `println!` for primary output, `eprintln!` for status messages.

mod constants;

// Re-exports from anstream (auto-detecting output)
pub use anstream::{eprint, eprintln, print, println, stderr, stdout};

pub use constants::*;

use std::sync::atomic::{AtomicU8, Ordering};

/// Global verbosity level, set at startup.
/// 0 = normal, 1 = verbose (-v), 2+ = debug (-vv)
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Set the global verbosity level.
///
/// Call this once at startup after parsing CLI arguments.
pub fn set_verbosity(level: u8) {
    VERBOSITY.store(level, Ordering::Relaxed);
}

pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Indent each line of `content` under a dim gutter bar.
///
/// Used to quote commands and captured error output beneath a status line.
pub fn format_with_gutter(content: &str) -> String {
    let bar = color_print::cstr!("<dim>│</>");
    content
        .lines()
        .map(|line| format!("  {bar} {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
