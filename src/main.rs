use std::io::Write;
use std::process;

use clap::Parser;
use forkspace::config::set_config_path;
use forkspace::exit_code;
use forkspace::git::set_base_path;
use forkspace::styling::set_verbosity;

mod cli;
mod commands;

use cli::{Cli, Commands, StateCommand};

/// `-v` count to log level; `RUST_LOG` wins when set.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}",
                record.level().as_str().to_lowercase(),
                record.args()
            )
        })
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    set_verbosity(cli.verbose);
    if let Some(path) = cli.directory {
        set_base_path(path);
    }
    if let Some(path) = cli.config {
        set_config_path(path);
    }

    let result = match cli.command {
        Commands::Open {
            branch,
            create,
            base,
            no_session,
            no_editor,
            no_setup,
            fork_state,
            session,
        } => commands::handle_open(commands::OpenOptions {
            branch: &branch,
            create,
            base: base.as_deref(),
            session: !no_session,
            editor: !no_editor,
            setup: !no_setup,
            fork_state,
            attach: session.attach,
            rollback_on_failure: session.rollback_on_failure,
        }),
        Commands::Up { session } => commands::handle_up(session.attach, session.rollback_on_failure),
        Commands::Plan { session, dir } => commands::handle_plan(session.as_deref(), dir.as_deref()),
        Commands::List { json } => commands::handle_list(json),
        Commands::State { action } => match action {
            StateCommand::Id { folder } => commands::handle_state_id(&folder),
            StateCommand::Fork {
                source,
                target,
                storage_dir,
            } => commands::handle_state_fork(&source, &target, storage_dir.as_deref()),
        },
    };

    if let Err(e) = result {
        commands::print_error(&e);
        process::exit(exit_code(&e));
    }
}
