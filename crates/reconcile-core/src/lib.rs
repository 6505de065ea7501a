//! Idempotent file content reconciliation
//!
//! Given a target path and the content it should hold, [`reconcile`] makes
//! the entry exist with exactly that content and reports whether anything
//! had to change. A dry run walks the same read-only steps and reports the
//! same verdict without touching the filesystem.
//!
//! ```text
//! resolve path -> read actual content -> decide action -> write (unless dry run) -> report
//! ```

pub mod action;
pub mod error;
pub mod options;
pub mod params;
pub mod reconcile;
pub mod result;
pub mod state;

pub use action::{Action, decide};
pub use error::{ErrorKind, ErrorReport, ReconcileError, Result};
pub use options::ReconcileOptions;
pub use params::ReconcileParams;
pub use reconcile::reconcile;
pub use result::{ContentDiff, ReconcileResult};
pub use state::{ActualState, DesiredState};

// Re-export the filesystem layer's tuning knobs for callers
pub use reconcile_fs::RobustnessConfig;
