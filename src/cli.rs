use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Parser, Subcommand};

fn help_styles() -> Styles {
    let green = anstyle::Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    Styles::styled()
        .header(green)
        .usage(green)
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(green)
        .invalid(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
}

#[derive(Parser)]
#[command(name = "forkspace")]
#[command(about = "Git worktrees with tmux sessions and forked editor state", long_about = None)]
#[command(version, styles = help_styles(), arg_required_else_help = true)]
pub(crate) struct Cli {
    /// Working directory for this command
    #[arg(
        short = 'C',
        global = true,
        value_name = "path",
        display_order = 100,
        help_heading = "Global Options"
    )]
    pub directory: Option<PathBuf>,

    /// User config file path
    #[arg(
        long,
        global = true,
        value_name = "path",
        display_order = 101,
        help_heading = "Global Options"
    )]
    pub config: Option<PathBuf>,

    /// Show progress (-v) or every external command (-vv)
    #[arg(
        long,
        short = 'v',
        global = true,
        action = clap::ArgAction::Count,
        display_order = 102,
        help_heading = "Global Options"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Session options shared by `open` and `up`
#[derive(clap::Args, Debug, Clone, Default)]
pub(crate) struct SessionArgs {
    /// Attach to the session when done
    #[arg(long)]
    pub attach: bool,

    /// Kill the session if any tmux command in its layout fails
    #[arg(long)]
    pub rollback_on_failure: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Open a worktree for a branch
    ///
    /// Reuses the branch's worktree if it has one, otherwise creates it at the
    /// `worktree-path` location, copies configured files and runs setup. Then
    /// provisions the tmux session and launches the editor.
    #[command(after_long_help = r#"## Examples

```console
forkspace open feature-auth                  # Existing branch
forkspace open --create new-feature          # New branch from HEAD
forkspace open --create hotfix --base main   # New branch from main
forkspace open feature-auth --fork-state     # Carry editor tabs and layout over
```"#)]
    Open {
        /// Branch name
        branch: String,

        /// Create a new branch
        #[arg(short = 'c', long)]
        create: bool,

        /// Base for the new branch (only with --create)
        #[arg(short = 'b', long, value_name = "ref")]
        base: Option<String>,

        /// Skip the tmux session
        #[arg(long)]
        no_session: bool,

        /// Don't launch the editor
        #[arg(long)]
        no_editor: bool,

        /// Skip setup commands
        #[arg(long)]
        no_setup: bool,

        /// Fork the editor's workspace state into the new worktree
        #[arg(long)]
        fork_state: bool,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Provision the tmux session for the current worktree
    Up {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Print the tmux commands a session would be built with
    ///
    /// Nothing is executed.
    Plan {
        /// Session name (defaults to the configured session name)
        #[arg(long, value_name = "name")]
        session: Option<String>,

        /// Working directory for the session (defaults to the worktree root)
        #[arg(long, value_name = "path")]
        dir: Option<PathBuf>,
    },

    /// List worktrees
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Editor workspace state
    State {
        #[command(subcommand)]
        action: StateCommand,
    },
}

#[derive(Subcommand)]
pub(crate) enum StateCommand {
    /// Print the editor's workspace identity for a folder
    Id {
        folder: PathBuf,
    },

    /// Copy a folder's workspace state to another folder
    ///
    /// Does nothing if the target already has state.
    Fork {
        source: PathBuf,
        target: PathBuf,

        /// Workspace storage root (defaults to the configured editor's)
        #[arg(long, value_name = "path")]
        storage_dir: Option<PathBuf>,
    },
}
