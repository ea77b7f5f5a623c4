//! I/O helpers for deploy runs.

pub mod bridge;
pub mod config;
pub mod process;
pub mod scan;
