use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a template binary with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input larger than the accepted maximum.
    #[error("input exceeds {limit} bytes")]
    InputTooLarge {
        /// Maximum accepted size in bytes.
        limit: usize,
    },

    /// Input was not UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The options file could not be read or decoded.
    #[error("invalid config {path}: {message}")]
    Config {
        /// Path given on the command line.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
}

/// Result type for the CLI protocol.
pub type Result<T> = std::result::Result<T, CliError>;
