//! Declarative tmux sessions
//!
//! A session layout is a list of [`Window`]s, each either a single command or
//! a list of [`Pane`]s split in one direction. [`compile`] turns the layout
//! into a flat, ordered list of [`TmuxCommand`]s without touching tmux;
//! [`execute_commands`] replays that list against a live server.
//!
//! Keeping the two apart means a plan can be printed (`forkspace plan`),
//! asserted on in tests, and only then executed.

mod compile;
mod execute;
mod session;

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ForkspaceError, RESERVED_WINDOW_CHARS};

pub use compile::{compile, compile_window_panes, env_args};
pub use execute::{SystemTmux, TmuxRunner, execute_commands};
pub use session::{
    SessionOutcome, attach_session, exact_target, has_session, is_inside_tmux, kill_session,
    provision_session, sanitize_session_name,
};

/// Session-level environment variables, in declaration order.
pub type SessionEnv = IndexMap<String, String>;

/// Direction in which a window's panes are split
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SplitDirection {
    /// Side by side (`split-window -h`)
    #[default]
    Horizontal,
    /// Stacked (`split-window -v`)
    Vertical,
}

impl SplitDirection {
    pub fn flag(self) -> &'static str {
        match self {
            Self::Horizontal => "-h",
            Self::Vertical => "-v",
        }
    }
}

/// One of tmux's built-in layout presets
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LayoutPreset {
    EvenHorizontal,
    EvenVertical,
    MainHorizontal,
    MainVertical,
    #[default]
    Tiled,
}

impl LayoutPreset {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A pane inside a split window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pane {
    /// Display name; not used for targeting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Shell command typed into the pane after it is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl Pane {
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            name: None,
            command: Some(command.into()),
        }
    }
}

/// A tmux window declared in the project config.
///
/// ```toml
/// [[windows]]
/// name = "dev"
/// split = "vertical"
/// layout = "main-horizontal"
/// panes = [{ command = "npm run dev" }, { command = "npm run test -- --watch" }]
///
/// [[windows]]
/// name = "shell"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Window {
    pub name: String,
    /// Command for a window without panes; ignored when panes are declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutPreset>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panes: Vec<Pane>,
}

impl Window {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn split_direction(&self) -> SplitDirection {
        self.split.unwrap_or_default()
    }

    pub fn layout_preset(&self) -> LayoutPreset {
        self.layout.unwrap_or_default()
    }
}

/// Reject names tmux would misread as target syntax, and duplicates.
///
/// Run at config load time so a bad layout fails before any tmux command is issued.
pub fn validate_windows(windows: &[Window]) -> Result<(), ForkspaceError> {
    let mut seen = HashSet::new();
    for window in windows {
        if window.name.is_empty() || window.name.contains(RESERVED_WINDOW_CHARS) {
            return Err(ForkspaceError::InvalidWindowName {
                name: window.name.clone(),
            });
        }
        if !seen.insert(window.name.as_str()) {
            return Err(ForkspaceError::DuplicateWindowName {
                name: window.name.clone(),
            });
        }
    }
    Ok(())
}

/// The primitive tmux operations a plan is made of.
///
/// `Display` yields the tmux subcommand name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommandKind {
    NewSession,
    NewWindow,
    SplitWindow,
    SetEnvironment,
    SendKeys,
    SelectLayout,
    SelectWindow,
}

/// One step of a compiled session plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TmuxCommand {
    pub kind: CommandKind,
    pub args: Vec<String>,
}

impl TmuxCommand {
    pub fn new(kind: CommandKind, args: Vec<String>) -> Self {
        Self { kind, args }
    }

    /// Arguments for the `tmux` binary: subcommand followed by its args.
    pub fn argv(&self) -> Vec<String> {
        let kind: &'static str = self.kind.into();
        std::iter::once(kind.to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Renders as a shell-quoted `tmux ...` line that can be pasted into a terminal.
impl fmt::Display for TmuxCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tmux")?;
        for arg in self.argv() {
            write!(f, " {}", shell_escape::unix::escape(arg.into()))?;
        }
        Ok(())
    }
}
