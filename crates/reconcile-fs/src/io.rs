//! Byte-exact reads, atomic writes and advisory locking

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, Result, TargetPath};

/// Tuning for writes and lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying a contended lock before giving up.
    pub lock_timeout: Duration,
    /// Flush file data and the directory entry to disk before returning.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Read the full content of an existing entry.
///
/// Symbolic links are followed. Directories, devices, FIFOs and sockets are
/// refused before any read is attempted.
pub fn read_bytes(path: &TargetPath) -> Result<Vec<u8>> {
    let native = path.as_path();
    let metadata = fs::metadata(native).map_err(|e| Error::io(native, e))?;

    if !metadata.is_file() {
        return Err(Error::NotRegularFile {
            path: native.to_path_buf(),
            kind: describe_file_type(&metadata.file_type()),
        });
    }

    fs::read(native).map_err(|e| Error::io(native, e))
}

/// Replace the entry's content atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the destination. Readers see either the old content or the new content,
/// never a partial file, and an interrupted write leaves no empty file
/// behind. Missing parent directories are not created.
///
/// An existing destination keeps its permission bits and, where the caller
/// may set them, its owner and group. A new one gets the mode a plain
/// `open()` would give it. Hard links to the old file are not carried over.
pub fn write_atomic(path: &TargetPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let destination = path.write_destination()?;
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let previous = fs::metadata(&destination).ok();

    let prefix = format!(".{}.", path.short_name());
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let mut temp = builder.tempfile_in(&dir).map_err(|e| Error::io(&dir, e))?;
    let temp_path = temp.path().to_path_buf();

    if let Some(metadata) = &previous {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::io(&temp_path, e))?;
        #[cfg(unix)]
        keep_owner(temp.as_file(), metadata, &temp_path);
    }

    temp.write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    if config.enable_fsync {
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::io(&temp_path, e))?;
    }

    // The temp file is removed on drop if the rename fails.
    temp.persist(&destination)
        .map_err(|e| Error::io(&destination, e.error))?;

    if config.enable_fsync {
        sync_dir(&dir)?;
    }

    tracing::debug!(
        destination = %destination.display(),
        bytes = content.len(),
        "Replaced file content"
    );
    Ok(())
}

/// Give the replacement file the owner and group of the one it replaces.
///
/// Only privileged callers can usually change ownership, so a refusal leaves
/// the temp file owned by the caller and the write goes ahead.
#[cfg(unix)]
fn keep_owner(file: &File, previous: &fs::Metadata, temp_path: &Path) {
    use std::os::unix::fs::MetadataExt;

    let owned = match file.metadata() {
        Ok(current) => current.uid() == previous.uid() && current.gid() == previous.gid(),
        Err(_) => false,
    };
    if owned {
        return;
    }
    if let Err(e) = std::os::unix::fs::fchown(file, Some(previous.uid()), Some(previous.gid())) {
        tracing::debug!(
            temp = %temp_path.display(),
            error = %e,
            "Could not carry owner over to replacement file"
        );
    }
}

/// An exclusive advisory lock on a target's sidecar lock file.
///
/// Released on drop. The sidecar itself is left in place so every locker
/// agrees on the same inode.
#[derive(Debug)]
pub struct TargetLock {
    file: File,
    path: PathBuf,
}

impl TargetLock {
    /// Path of the sidecar lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TargetLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::debug!(lock = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}

/// Take an exclusive lock for `target`, retrying while it is contended.
///
/// Gives up with [`Error::LockFailed`] once `config.lock_timeout` has
/// elapsed. The lock file lives in the target's directory, so that
/// directory must already exist.
pub fn lock_target(target: &TargetPath, config: RobustnessConfig) -> Result<TargetLock> {
    let lock_path = target.lock_path();
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;

    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(250),
        max_elapsed_time: Some(config.lock_timeout),
        ..ExponentialBackoff::default()
    };

    let started = Instant::now();
    let attempt = || match FileExt::try_lock_exclusive(&file) {
        Ok(()) => Ok(()),
        Err(e) if is_contended(&e) => {
            tracing::debug!(lock = %lock_path.display(), "Lock is held elsewhere, retrying");
            Err(backoff::Error::transient(e))
        }
        Err(e) => Err(backoff::Error::permanent(e)),
    };

    match backoff::retry(policy, attempt) {
        Ok(()) => {
            tracing::debug!(lock = %lock_path.display(), "Acquired lock");
            Ok(TargetLock {
                file,
                path: lock_path,
            })
        }
        Err(backoff::Error::Permanent(e)) => Err(Error::io(&lock_path, e)),
        Err(backoff::Error::Transient { .. }) => {
            let waited = started.elapsed();
            tracing::warn!(
                lock = %lock_path.display(),
                waited_ms = waited.as_millis() as u64,
                "Timed out waiting for lock"
            );
            Err(Error::LockFailed {
                path: lock_path,
                waited,
            })
        }
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| Error::io(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

fn describe_file_type(file_type: &fs::FileType) -> &'static str {
    if file_type.is_dir() {
        return "directory";
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_block_device() {
            return "block device";
        }
        if file_type.is_char_device() {
            return "character device";
        }
        if file_type.is_fifo() {
            return "FIFO";
        }
        if file_type.is_socket() {
            return "socket";
        }
    }
    "special file"
}
