//! # CLI Module
//!
//! Thin command-line front end: parse arguments, dispatch, print errors.
//! All real work happens in the coordinator and store.

pub mod args;
pub mod commands;
pub mod errors;

pub use args::{Cli, Command};
pub use errors::{CliError, CliResult};

/// Parse arguments and run the selected command.
pub fn run() -> CliResult<()> {
    commands::run(Cli::parse_args())
}
