//! Per-run switches

use reconcile_fs::RobustnessConfig;

/// How a reconcile run behaves. Defaults to a real, unlocked run without
/// diff reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Compute the verdict but never mutate the filesystem
    pub dry_run: bool,
    /// Attach a before/after diff to the result when something changes
    pub diff: bool,
    /// Hold an advisory lock on the target for the duration of a real run
    pub lock: bool,
    /// Write and lock tuning
    pub robustness: RobustnessConfig,
}

impl ReconcileOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    pub fn with_diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }
}
