//! The reconciliation decision
//!
//! [`decide`] is pure: no I/O, same answer for the same inputs. Dry runs and
//! real runs call it identically, which is what keeps their `changed` flags
//! in agreement.

use crate::ActualState;

/// The single mutation a run will perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// The entry already holds the desired bytes
    NoOp,
    /// Nothing exists at the path yet
    Create(&'a str),
    /// The entry exists with different bytes
    Overwrite(&'a str),
}

impl Action<'_> {
    /// Whether this action mutates the filesystem when applied.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Create(_) => "create",
            Self::Overwrite(_) => "overwrite",
        }
    }
}

/// Choose the action that brings `actual` to `desired`.
///
/// Equality is byte-exact: no trimming, no newline translation, no
/// encoding normalization.
pub fn decide<'a>(actual: &ActualState, desired: &'a str) -> Action<'a> {
    match actual {
        ActualState::Absent => Action::Create(desired),
        ActualState::Present(bytes) if bytes.as_slice() == desired.as_bytes() => Action::NoOp,
        ActualState::Present(_) => Action::Overwrite(desired),
    }
}
