//! Command implementations

mod apply;

pub use apply::{run_apply, run_check};
