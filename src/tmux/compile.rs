//! Layout compilation: windows and panes to an ordered tmux command list.
//!
//! The output for one window always has this shape:
//!
//! ```text
//! new-session | new-window          creates the window with pane 0
//! send-keys                         pane 0's command, if any
//! (split-window, send-keys?)*       one split per further pane
//! select-layout                     only when the window has 2+ panes
//! ```
//!
//! followed, after the last window, by one `select-window` back to the first.
//! tmux focuses the newest pane after a split, so `send-keys` can always target
//! the window rather than a pane index.

use std::path::Path;

use super::session::exact_target;
use super::{CommandKind, SessionEnv, TmuxCommand, Window};

/// Repeated `-e KEY=VALUE` flags for commands that create a shell.
///
/// The first shell of a session starts before any `set-environment` can run,
/// so variables are passed inline as well as set at session level.
pub fn env_args(env: &SessionEnv) -> Vec<String> {
    env.iter()
        .flat_map(|(key, value)| ["-e".to_string(), format!("{key}={value}")])
        .collect()
}

/// Compile a session layout into tmux commands.
///
/// Pure: the same inputs always yield the same list. The first command is
/// always `new-session`; when `windows` is non-empty the last is a
/// `select-window` targeting the first window.
pub fn compile(
    session_name: &str,
    working_dir: &Path,
    windows: &[Window],
    env: &SessionEnv,
) -> Vec<TmuxCommand> {
    let dir = working_dir.to_string_lossy().into_owned();
    let env_flags = env_args(env);
    let mut commands = Vec::new();

    let Some((first, rest)) = windows.split_first() else {
        commands.push(new_session(session_name, None, &dir, &env_flags));
        commands.extend(set_environment(session_name, env));
        return commands;
    };

    commands.push(new_session(
        session_name,
        Some(first.name.as_str()),
        &dir,
        &env_flags,
    ));
    commands.extend(set_environment(session_name, env));
    commands.extend(compile_window_panes(
        &exact_target(session_name, Some(first.name.as_str())),
        working_dir,
        first,
        &env_flags,
    ));

    for window in rest {
        let mut args = vec![
            "-t".to_string(),
            // Trailing colon: next free index in the session
            format!("{}:", exact_target(session_name, None)),
            "-n".to_string(),
            window.name.clone(),
        ];
        args.extend(env_flags.iter().cloned());
        args.extend(["-c".to_string(), dir.clone()]);
        commands.push(TmuxCommand::new(CommandKind::NewWindow, args));

        commands.extend(compile_window_panes(
            &exact_target(session_name, Some(window.name.as_str())),
            working_dir,
            window,
            &env_flags,
        ));
    }

    commands.push(TmuxCommand::new(
        CommandKind::SelectWindow,
        vec![
            "-t".to_string(),
            exact_target(session_name, Some(first.name.as_str())),
        ],
    ));

    commands
}

/// Compile the pane program for one already-created window.
///
/// `target` is the exact window target (`=session:window`). Pane 0 lives in
/// the window's initial pane; every further pane costs one `split-window`.
pub fn compile_window_panes(
    target: &str,
    working_dir: &Path,
    window: &Window,
    env_args: &[String],
) -> Vec<TmuxCommand> {
    let mut commands = Vec::new();

    let Some((first_pane, other_panes)) = window.panes.split_first() else {
        if let Some(command) = &window.command {
            commands.push(send_keys(target, command));
        }
        return commands;
    };

    if let Some(command) = &first_pane.command {
        commands.push(send_keys(target, command));
    }

    let split_flag = window.split_direction().flag();
    for pane in other_panes {
        let mut args = vec![
            split_flag.to_string(),
            "-t".to_string(),
            target.to_string(),
        ];
        args.extend(env_args.iter().cloned());
        args.extend(["-c".to_string(), working_dir.to_string_lossy().into_owned()]);
        commands.push(TmuxCommand::new(CommandKind::SplitWindow, args));

        if let Some(command) = &pane.command {
            commands.push(send_keys(target, command));
        }
    }

    if !other_panes.is_empty() {
        commands.push(TmuxCommand::new(
            CommandKind::SelectLayout,
            vec![
                "-t".to_string(),
                target.to_string(),
                window.layout_preset().as_str().to_string(),
            ],
        ));
    }

    commands
}

fn new_session(
    session_name: &str,
    first_window: Option<&str>,
    dir: &str,
    env_flags: &[String],
) -> TmuxCommand {
    let mut args = vec!["-d".to_string(), "-s".to_string(), session_name.to_string()];
    if let Some(name) = first_window {
        args.extend(["-n".to_string(), name.to_string()]);
    }
    args.extend(env_flags.iter().cloned());
    args.extend(["-c".to_string(), dir.to_string()]);
    TmuxCommand::new(CommandKind::NewSession, args)
}

fn set_environment<'a>(
    session_name: &'a str,
    env: &'a SessionEnv,
) -> impl Iterator<Item = TmuxCommand> + 'a {
    env.iter().map(move |(key, value)| {
        TmuxCommand::new(
            CommandKind::SetEnvironment,
            vec![
                "-t".to_string(),
                exact_target(session_name, None),
                key.clone(),
                value.clone(),
            ],
        )
    })
}

fn send_keys(target: &str, command: &str) -> TmuxCommand {
    TmuxCommand::new(
        CommandKind::SendKeys,
        vec![
            "-t".to_string(),
            target.to_string(),
            command.to_string(),
            "Enter".to_string(),
        ],
    )
}
