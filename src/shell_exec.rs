//! External command execution
//!
//! Every process forkspace starts (git, tmux, the editor, setup commands) goes
//! through [`run`] or [`run_interactive`] so each invocation is logged with its
//! duration at debug level:
//!
//! ```text
//! $ tmux new-session -d -s app [tmux]
//! [fs-trace] context=tmux cmd="tmux new-session -d -s app" dur=8.1ms ok=true
//! ```
//!
//! Setup commands are shell strings; [`ShellConfig`] picks the interpreter:
//! - Unix: `sh -c`
//! - Windows: `powershell -NoProfile -Command`

use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};
use std::sync::OnceLock;
use std::time::Instant;

static SHELL_CONFIG: OnceLock<ShellConfig> = OnceLock::new();

/// Shell used to interpret setup command strings
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Path to the shell executable
    pub executable: PathBuf,
    /// Arguments to pass before the command (e.g., ["-c"] for sh)
    pub args: Vec<String>,
    /// Human-readable name for error messages
    pub name: String,
}

impl ShellConfig {
    pub fn get() -> &'static ShellConfig {
        SHELL_CONFIG.get_or_init(detect_shell)
    }

    /// Create a Command that hands `shell_command` to the shell for interpretation.
    pub fn command(&self, shell_command: &str) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args);
        cmd.arg(shell_command);
        cmd
    }
}

fn detect_shell() -> ShellConfig {
    if cfg!(windows) {
        ShellConfig {
            executable: PathBuf::from("powershell.exe"),
            args: vec!["-NoProfile".to_string(), "-Command".to_string()],
            name: "PowerShell".to_string(),
        }
    } else {
        ShellConfig {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string()],
            name: "sh".to_string(),
        }
    }
}

fn command_line(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

fn trace(cmd_str: &str, context: Option<&str>, duration_ms: f64, outcome: &str) {
    match context {
        Some(ctx) => log::debug!(
            "[fs-trace] context={} cmd=\"{}\" dur={:.1}ms {}",
            ctx,
            cmd_str,
            duration_ms,
            outcome
        ),
        None => log::debug!(
            "[fs-trace] cmd=\"{}\" dur={:.1}ms {}",
            cmd_str,
            duration_ms,
            outcome
        ),
    }
}

/// Execute a command with captured output, timing, and debug logging.
///
/// The `context` parameter names the subsystem or worktree (`tmux`, a branch
/// name), or `None` for standalone tools.
pub fn run(cmd: &mut Command, context: Option<&str>) -> std::io::Result<Output> {
    let cmd_str = command_line(cmd);
    match context {
        Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
        None => log::debug!("$ {}", cmd_str),
    }

    let t0 = Instant::now();
    let result = cmd.output();
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(output) => trace(
            &cmd_str,
            context,
            duration_ms,
            &format!("ok={}", output.status.success()),
        ),
        Err(e) => trace(&cmd_str, context, duration_ms, &format!("err=\"{e}\"")),
    }

    result
}

/// Execute a command attached to the user's terminal (inherited stdio).
///
/// Used for setup commands and `tmux attach-session`, where output should
/// stream straight to the user.
pub fn run_interactive(cmd: &mut Command, context: Option<&str>) -> std::io::Result<ExitStatus> {
    let cmd_str = command_line(cmd);
    match context {
        Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
        None => log::debug!("$ {}", cmd_str),
    }

    let t0 = Instant::now();
    let result = cmd.status();
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(status) => trace(
            &cmd_str,
            context,
            duration_ms,
            &format!("ok={}", status.success()),
        ),
        Err(e) => trace(&cmd_str, context, duration_ms, &format!("err=\"{e}\"")),
    }

    result
}
