//! Desired and observed state of the target entry

use crate::{ReconcileError, Result};

/// What the caller wants at the target path. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    path: String,
    content: String,
}

impl DesiredState {
    /// Build a desired state. The path must be non-empty; the content may
    /// be anything, including empty.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(ReconcileError::path_error(
                path.clone(),
                reconcile_fs::Error::invalid_path(path, "path must not be empty"),
            ));
        }
        Ok(Self {
            path,
            content: content.into(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// What is currently on disk at the target path.
///
/// An absent entry is distinct from a present, empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActualState {
    Absent,
    Present(Vec<u8>),
}

impl ActualState {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// The observed bytes, or `None` when nothing exists.
    pub fn content(&self) -> Option<&[u8]> {
        match self {
            Self::Absent => None,
            Self::Present(bytes) => Some(bytes),
        }
    }
}
