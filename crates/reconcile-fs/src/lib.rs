//! Filesystem layer for the content reconciler
//!
//! Provides non-dereferencing path resolution, byte-exact reads and
//! atomic, optionally locked, writes.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
pub use io::{RobustnessConfig, TargetLock};
pub use path::{ResolvedPath, TargetPath};
