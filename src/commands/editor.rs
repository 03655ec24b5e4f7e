use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, bail};
use forkspace::shell_exec::run;

/// Launch `editor` on `folder`.
///
/// `editor` is split on whitespace so `code --new-window` works; the folder is
/// appended as the last argument. GUI launchers return immediately.
pub(crate) fn launch_editor(editor: &str, folder: &Path) -> anyhow::Result<()> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("Editor command is empty");
    };

    let mut cmd = Command::new(program);
    cmd.args(parts).arg(folder).stdin(Stdio::null());
    let output = run(&mut cmd, Some("editor"))
        .with_context(|| format!("Failed to launch editor {program}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{program} exited with {}: {}", output.status, stderr.trim());
    }
    Ok(())
}
