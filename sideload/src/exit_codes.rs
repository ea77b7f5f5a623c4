//! Stable exit codes for the `sideload` CLI.
//!
//! A failing bridge command propagates its own exit code instead.

/// Every package installed and media pushed (or skipped).
pub const OK: i32 = 0;
/// Missing package file, invalid config, spawn failure, or a child killed by a signal.
pub const FAILURE: i32 = 1;
