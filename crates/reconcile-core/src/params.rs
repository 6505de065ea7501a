//! Static, typed parameter schema
//!
//! Parameters arrive from flags or from a params file and are validated
//! into a [`DesiredState`] plus [`ReconcileOptions`] before any filesystem
//! work starts.

use std::path::Path;
use std::time::Duration;

use reconcile_fs::{ConfigStore, RobustnessConfig};
use serde::{Deserialize, Serialize};

use crate::{DesiredState, ReconcileOptions, Result};

/// Parameters of one reconcile run.
///
/// | field             | type   | required | default |
/// |-------------------|--------|----------|---------|
/// | `path`            | string | yes      |         |
/// | `content`         | string | yes      |         |
/// | `dry_run`         | bool   | no       | false   |
/// | `diff`            | bool   | no       | false   |
/// | `lock`            | bool   | no       | false   |
/// | `lock_timeout_ms` | int    | no       | 5000    |
/// | `fsync`           | bool   | no       | true    |
///
/// `dry_run` also accepts the host-style spellings `dryRun` and
/// `check_mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileParams {
    pub path: String,
    pub content: String,
    #[serde(default, alias = "dryRun", alias = "check_mode")]
    pub dry_run: bool,
    #[serde(default)]
    pub diff: bool,
    #[serde(default)]
    pub lock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fsync: Option<bool>,
}

impl ReconcileParams {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            dry_run: false,
            diff: false,
            lock: false,
            lock_timeout_ms: None,
            fsync: None,
        }
    }

    /// Load parameters from a `.json`, `.toml`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> reconcile_fs::Result<Self> {
        ConfigStore::new().load(path)
    }

    /// Check constraints and split into state and options.
    pub fn validate(&self) -> Result<(DesiredState, ReconcileOptions)> {
        let desired = DesiredState::new(self.path.clone(), self.content.clone())?;

        let defaults = RobustnessConfig::default();
        let robustness = RobustnessConfig {
            lock_timeout: self
                .lock_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.lock_timeout),
            enable_fsync: self.fsync.unwrap_or(defaults.enable_fsync),
        };

        let options = ReconcileOptions {
            dry_run: self.dry_run,
            diff: self.diff,
            lock: self.lock,
            robustness,
        };

        Ok((desired, options))
    }
}
