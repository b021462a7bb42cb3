//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the File Browser
//!
//! Every fallible operation in the core returns `AppResult<T>`. None of these
//! errors are fatal: the dispatcher turns them into pending error messages for
//! the user, and only an explicit quit ends the program.

use std::{io, path::PathBuf};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Unified error type for all file browser operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A directory listing could not be read (removed, permissions, ...).
    #[error("Directory unavailable: {path:?}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File operation specific errors
    #[error("File operation '{operation}' failed on {path:?}: {reason}")]
    FileOperationFailed {
        operation: String, // "rename", "mkdir", "duplicate", ...
        path: PathBuf,
        reason: String,
    },

    /// Plugin protocol error (temp files, command file).
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input validation errors
    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create a directory-unavailable error
    pub fn directory_unavailable<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::DirectoryUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create a file operation failure error
    pub fn file_operation_failed<S1, P, S2>(operation: S1, path: P, reason: S2) -> Self
    where
        S1: Into<String>,
        P: Into<PathBuf>,
        S2: Into<String>,
    {
        Self::FileOperationFailed {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors raised because a directory listing failed.
    pub const fn is_directory_unavailable(&self) -> bool {
        matches!(self, Self::DirectoryUnavailable { .. })
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
