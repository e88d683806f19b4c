//! Typed error handling for kvlog.
//!
//! Only setup and teardown paths return these errors. The logging calls
//! themselves never fail: problems there are downgraded into extra fields or
//! warning records.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kvlog operations.
#[derive(Error, Debug)]
pub enum LogError {
    /// A `pattern=level` token in a module-verbosity list could not be parsed
    #[error("invalid module verbosity {token:?}: {reason}")]
    InvalidModule { token: String, reason: String },

    /// I/O error while creating or writing a sink
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A child handler failed to close cleanly
    #[error("failed to close {handler} handler: {message}")]
    Close { handler: String, message: String },

    /// Configuration file errors
    #[error("config error at {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl LogError {
    /// Create a module-verbosity parse error for one token.
    pub fn invalid_module(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidModule {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: err,
        }
    }

    /// Create a close error for the named handler.
    pub fn close(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Close {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for kvlog results.
pub type LogResult<T> = Result<T, LogError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> LogResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> LogResult<T> {
        self.map_err(|e| LogError::io(path, e))
    }
}
