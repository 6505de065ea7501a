//! Error types for reconcile-core
//!
//! Every failure of a reconcile run lands in one of four stages. None of
//! them is retried here; the caller decides whether to run again.

use serde::{Deserialize, Serialize};

/// Result type for reconcile-core operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Stage at which a reconcile run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The path could not be validated or traversed
    PathError,
    /// The existing entry could not be read
    ReadError,
    /// The missing entry could not be brought into existence
    CreationError,
    /// The content could not be fully written
    WriteError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PathError => "path_error",
            Self::ReadError => "read_error",
            Self::CreationError => "creation_error",
            Self::WriteError => "write_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal reconcile failure. No result record accompanies it.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Could not resolve target {path}: {source}")]
    Path {
        path: String,
        #[source]
        source: reconcile_fs::Error,
    },

    #[error("Could not read target {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: reconcile_fs::Error,
    },

    #[error("Could not create target {path}: {source}")]
    Creation {
        path: String,
        #[source]
        source: reconcile_fs::Error,
    },

    #[error("Could not write target {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: reconcile_fs::Error,
    },
}

impl ReconcileError {
    pub fn path_error(path: impl Into<String>, source: reconcile_fs::Error) -> Self {
        Self::Path {
            path: path.into(),
            source,
        }
    }

    pub fn read(path: impl Into<String>, source: reconcile_fs::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn creation(path: impl Into<String>, source: reconcile_fs::Error) -> Self {
        Self::Creation {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<String>, source: reconcile_fs::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Path { .. } => ErrorKind::PathError,
            Self::Read { .. } => ErrorKind::ReadError,
            Self::Creation { .. } => ErrorKind::CreationError,
            Self::Write { .. } => ErrorKind::WriteError,
        }
    }

    /// The offending path, as the caller spelled it.
    pub fn path(&self) -> &str {
        match self {
            Self::Path { path, .. }
            | Self::Read { path, .. }
            | Self::Creation { path, .. }
            | Self::Write { path, .. } => path,
        }
    }

    /// Structured form handed to the caller.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            path: self.path().to_string(),
        }
    }
}

/// Serializable `{ kind, message, path }` record of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub path: String,
}
