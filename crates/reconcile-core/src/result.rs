//! Result record handed back to the caller

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use crate::{Action, ActualState};

/// Outcome of a successful run.
///
/// `changed` reflects the decided action, not whether it was applied, so a
/// dry run reports exactly what a real run would.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResult {
    pub dest: String,
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<ContentDiff>,
}

impl ReconcileResult {
    pub fn new(dest: impl Into<String>, action: &Action<'_>) -> Self {
        Self {
            dest: dest.into(),
            changed: action.is_change(),
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: Option<ContentDiff>) -> Self {
        self.diff = diff;
        self
    }
}

/// Before/after view of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDiff {
    /// Previous content; empty when the entry did not exist
    pub before: String,
    /// Desired content
    pub after: String,
    /// Line-based unified diff of `before` against `after`
    pub unified: String,
}

impl ContentDiff {
    /// Diff for the given action, or `None` when nothing changes.
    ///
    /// Non-UTF-8 previous content is shown lossily.
    pub fn compute(dest: &str, actual: &ActualState, action: &Action<'_>) -> Option<Self> {
        let (old_header, after) = match action {
            Action::NoOp => return None,
            Action::Create(after) => ("/dev/null".to_string(), *after),
            Action::Overwrite(after) => (format!("a/{}", dest), *after),
        };
        let before = actual
            .content()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        let new_header = format!("b/{}", dest);

        let unified = TextDiff::from_lines(before.as_str(), after)
            .unified_diff()
            .context_radius(3)
            .header(&old_header, &new_header)
            .to_string();

        Some(Self {
            before,
            after: after.to_string(),
            unified,
        })
    }
}
