// Integration tests drive the binary against throwaway git repositories
#![cfg(unix)]

pub mod list;
pub mod open;
pub mod plan;
pub mod state;
