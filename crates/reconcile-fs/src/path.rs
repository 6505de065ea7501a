//! Target path validation and entry-presence checks
//!
//! Presence is answered with `lexists` semantics: any directory entry at the
//! location counts, including a symbolic link whose target is missing. The
//! link itself is never followed for this check.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Longest slice of a target's file name reused in temp and lock file names.
/// Leaves room for the added prefix and suffix under a 255-byte name limit.
pub const MAX_STEM_LEN: usize = 200;

/// A validated path to the entry being reconciled.
///
/// Keeps the caller's original spelling for reporting and the encoded
/// platform path for I/O.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPath {
    raw: String,
    native: PathBuf,
}

/// A target path together with whether an entry exists there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: TargetPath,
    pub present: bool,
}

impl TargetPath {
    /// Validate and encode a path string.
    ///
    /// Rejects empty strings, interior NUL bytes and paths with no final
    /// file name component (such as `..` or `/`).
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();

        if raw.is_empty() {
            return Err(Error::invalid_path(raw, "path must not be empty"));
        }
        if raw.contains('\0') {
            return Err(Error::invalid_path(raw, "path contains a NUL byte"));
        }

        let native = PathBuf::from(&raw);
        if native.file_name().is_none() {
            return Err(Error::invalid_path(raw, "path has no file name component"));
        }

        Ok(Self { raw, native })
    }

    /// Validate `raw` and check for an entry at that location.
    pub fn resolve(raw: impl Into<String>) -> Result<ResolvedPath> {
        let path = Self::new(raw)?;
        let present = path.lexists()?;
        tracing::debug!(path = %path, present, "Resolved target path");
        Ok(ResolvedPath { path, present })
    }

    /// Whether any entry exists at this location, without following links.
    ///
    /// "Not found" means absent. Every other failure (a parent that is a
    /// regular file, a parent without search permission, a name the
    /// platform rejects) means the path cannot be resolved at all.
    pub fn lexists(&self) -> Result<bool> {
        match fs::symlink_metadata(&self.native) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::invalid_path(
                self.raw.clone(),
                format!("cannot traverse path: {}", e),
            )),
        }
    }

    /// Whether the entry at this location is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        fs::symlink_metadata(&self.native)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    /// The path exactly as the caller spelled it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The encoded platform path.
    pub fn as_path(&self) -> &Path {
        &self.native
    }

    /// The final component of the path.
    pub fn file_name(&self) -> &str {
        // Validated in `new`, so the fallback is unreachable in practice.
        self.native
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.raw)
    }

    /// The directory holding the entry. A bare file name lives in `.`.
    pub fn parent_dir(&self) -> &Path {
        match self.native.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }

    /// The file name cut to at most [`MAX_STEM_LEN`] bytes on a char
    /// boundary, for building sibling file names that must still fit the
    /// platform's name limit.
    pub fn short_name(&self) -> &str {
        let name = self.file_name();
        if name.len() <= MAX_STEM_LEN {
            return name;
        }
        let mut end = MAX_STEM_LEN;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        &name[..end]
    }

    /// Sidecar file used for advisory locking: `.<file_name>.lock`.
    ///
    /// Long names are shortened first, so two targets sharing a long prefix
    /// share a lock.
    pub fn lock_path(&self) -> PathBuf {
        self.parent_dir().join(format!(".{}.lock", self.short_name()))
    }

    /// The path a write should land on.
    ///
    /// A symbolic link with an existing target is written through, so the
    /// link survives and its target receives the content. Anything else,
    /// including an absent entry, is written in place.
    pub fn write_destination(&self) -> Result<PathBuf> {
        if self.is_symlink() {
            fs::canonicalize(&self.native).map_err(|e| Error::io(&self.native, e))
        } else {
            Ok(self.native.clone())
        }
    }
}

impl AsRef<Path> for TargetPath {
    fn as_ref(&self) -> &Path {
        &self.native
    }
}

impl std::fmt::Display for TargetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
