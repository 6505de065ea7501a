//! Error types for reconcile-fs

use std::path::PathBuf;
use std::time::Duration;

/// Result type for reconcile-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reconcile-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {path} is a {kind}")]
    NotRegularFile { path: PathBuf, kind: &'static str },

    #[error("Lock acquisition failed for {path}: still held after {}ms", .waited.as_millis())]
    LockFailed { path: PathBuf, waited: Duration },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// The underlying OS error kind, if this error came from an I/O call.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
