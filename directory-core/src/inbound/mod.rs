//! Inbound adapters driving the directory.

pub mod cli;

pub use cli::{Cli, CliError, Command, run_command};
