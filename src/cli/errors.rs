//! CLI-specific error types
//!
//! Every CLI failure exits non-zero with a message on stderr.

use thiserror::Error;

use crate::config::ConfigError;
use crate::coordinator::CoordinatorError;
use crate::store::StoreError;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file problem.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `init` against an existing installation.
    #[error("Already initialized: {0}")]
    AlreadyInitialized(String),

    /// Store failure during a CLI command.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Mutation failure (seed).
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// Async runtime could not be created.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// HTTP server failed to bind or serve.
    #[error("Server error: {0}")]
    Server(String),
}
