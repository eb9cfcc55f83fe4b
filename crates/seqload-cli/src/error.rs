//! CLI-specific error types and exit codes.

use seqload_core::LoaderError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loader or transport setup failed.
    #[error("{0}")]
    Loader(#[from] LoaderError),

    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Manifest could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// Manifest was read but is not valid.
    #[error("Invalid manifest: {0}")]
    Manifest(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit code 1 is reserved for "ran, but some items failed".
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Manifest(_) => 65, // EX_DATAERR
            Self::Io(_) => 74,       // EX_IOERR
            Self::Loader(LoaderError::Config { .. }) => 78, // EX_CONFIG
            Self::Loader(LoaderError::RunnerStopped) => 70, // EX_SOFTWARE
        }
    }
}
