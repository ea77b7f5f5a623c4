//! Install Android packages and media onto a connected device.
//!
//! A run walks a directory tree for package files, installs each one through
//! the device bridge (`adb install -r`), then pushes the media directory to
//! device storage (`adb push`). Any failing step aborts the whole run.
//!
//! - **[`core`]**: Pure types (invocations, abort reasons). No I/O.
//! - **[`io`]**: Side-effecting operations (filesystem walk, config, process
//!   execution, the device bridge itself).
//!
//! [`deploy`] sequences the two phases and reports a [`deploy::DeployOutcome`]
//! that `main` turns into a process exit code.

pub mod core;
pub mod deploy;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
