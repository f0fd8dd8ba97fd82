//! Finite-state-machine engine core.
//!
//! - `table` -- the (source state, condition) -> destination mapping
//! - `hooks` -- before/after hook registry and the resolver seam
//! - `options` -- per-call retry configuration and backoff functions
//! - `machine` -- the transition engine itself

pub mod hooks;
pub mod machine;
pub mod options;
pub mod table;
