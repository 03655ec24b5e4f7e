mod context;
mod editor;
mod list;
mod open;
mod plan;
mod session;
mod setup;
mod state;

pub(crate) use list::handle_list;
pub(crate) use open::{OpenOptions, handle_open};
pub(crate) use plan::handle_plan;
pub(crate) use session::handle_up;
pub(crate) use state::{handle_state_fork, handle_state_id};

use forkspace::ForkspaceError;
use forkspace::styling::{eprintln, error_message};

/// Print an error to stderr, keeping the styling of typed errors.
pub(crate) fn print_error(err: &anyhow::Error) {
    match err.downcast_ref::<ForkspaceError>() {
        Some(typed) => eprintln!("{typed}"),
        None => eprintln!("{}", error_message(format!("{err:#}"))),
    }
}

/// Label for a configured command in status lines: `setup install` or `setup`.
pub(crate) fn format_command_label(command_type: &str, name: Option<&str>) -> String {
    match name {
        Some(name) => color_print::cformat!("{command_type} <bold>{name}</>"),
        None => command_type.to_string(),
    }
}
