//! Deterministic, pure types shared by the deploy phases.
//!
//! Core modules must be free of I/O side effects. They describe what to run
//! and why a run stopped, and are suitable for tests without a device.

pub mod abort;
pub mod invocation;
