//! The reconcile run
//!
//! ```text
//! Start -> Resolved -> Absent  -> Created                -> Reported
//!                   -> Present -> Matching               -> Reported
//!                              -> Differing -> Overwritten -> Reported
//! ```
//!
//! Any stage may instead end in a fatal [`ReconcileError`], in which case no
//! result is produced.

use reconcile_fs::{RobustnessConfig, TargetLock, TargetPath, io};
use tracing::{debug, info};

use crate::{
    Action, ActualState, ContentDiff, DesiredState, ReconcileError, ReconcileOptions,
    ReconcileResult, Result, decide,
};

/// Bring the entry at `desired.path()` to hold exactly `desired.content()`.
///
/// With `options.dry_run` every read-only step still runs and the returned
/// `changed` flag is the one a real run would report; only the write is
/// skipped.
pub fn reconcile(desired: &DesiredState, options: &ReconcileOptions) -> Result<ReconcileResult> {
    let dest = desired.path();

    let resolved =
        TargetPath::resolve(dest).map_err(|source| ReconcileError::path_error(dest, source))?;
    let target = resolved.path;
    let mut present = resolved.present;

    let _lock = if options.lock && !options.dry_run {
        let lock = acquire_lock(&target, present, options.robustness)?;
        // Someone may have created or removed the entry while we waited.
        present = target
            .lexists()
            .map_err(|source| ReconcileError::path_error(dest, source))?;
        Some(lock)
    } else {
        None
    };

    let actual = observe(&target, present)?;
    let action = decide(&actual, desired.content());
    debug!(path = %target, action = action.name(), dry_run = options.dry_run, "Decided action");

    let diff = if options.diff {
        ContentDiff::compute(dest, &actual, &action)
    } else {
        None
    };

    if options.dry_run {
        debug!(path = %target, "Dry run, skipping write");
    } else {
        apply(&target, &action, options.robustness)?;
    }

    Ok(ReconcileResult::new(dest, &action).with_diff(diff))
}

/// Read the current state. An absent entry is never read.
fn observe(target: &TargetPath, present: bool) -> Result<ActualState> {
    if !present {
        return Ok(ActualState::Absent);
    }
    let bytes =
        io::read_bytes(target).map_err(|source| ReconcileError::read(target.as_str(), source))?;
    debug!(path = %target, bytes = bytes.len(), "Read current content");
    Ok(ActualState::Present(bytes))
}

/// Perform the decided action. The only place that mutates the filesystem.
fn apply(target: &TargetPath, action: &Action<'_>, robustness: RobustnessConfig) -> Result<()> {
    match action {
        Action::NoOp => Ok(()),
        Action::Create(content) => {
            io::write_atomic(target, content.as_bytes(), robustness)
                .map_err(|source| ReconcileError::creation(target.as_str(), source))?;
            info!(path = %target, bytes = content.len(), "Created file");
            Ok(())
        }
        Action::Overwrite(content) => {
            io::write_atomic(target, content.as_bytes(), robustness)
                .map_err(|source| ReconcileError::write(target.as_str(), source))?;
            info!(path = %target, bytes = content.len(), "Overwrote file");
            Ok(())
        }
    }
}

/// Take the target's advisory lock. A failure is attributed to the
/// mutation the run was heading for.
fn acquire_lock(
    target: &TargetPath,
    present: bool,
    robustness: RobustnessConfig,
) -> Result<TargetLock> {
    io::lock_target(target, robustness).map_err(|source| {
        if present {
            ReconcileError::write(target.as_str(), source)
        } else {
            ReconcileError::creation(target.as_str(), source)
        }
    })
}
