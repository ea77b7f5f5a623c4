//! Why a run stopped early, and with which exit code.

use std::fmt;
use std::path::PathBuf;

use crate::exit_codes;

/// Reason a deploy run was cut short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// A package path handed to the installer does not exist.
    MissingPackage(PathBuf),
    /// The bridge tool exited non-zero (`code` is `None` when killed by a signal).
    CommandFailed {
        program: String,
        command_line: String,
        code: Option<i32>,
    },
}

/// Fail-fast stop carrying the exit code the process should terminate with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abort {
    pub code: i32,
    pub reason: AbortReason,
}

impl Abort {
    pub fn missing_package(path: impl Into<PathBuf>) -> Self {
        Self {
            code: exit_codes::FAILURE,
            reason: AbortReason::MissingPackage(path.into()),
        }
    }

    /// Build an abort for a failed command. The child's own exit code is kept;
    /// a signal-terminated child (no code) maps to [`exit_codes::FAILURE`].
    pub fn command_failed(program: &str, command_line: String, code: Option<i32>) -> Self {
        Self {
            code: failure_exit_code(code),
            reason: AbortReason::CommandFailed {
                program: program.to_string(),
                command_line,
                code,
            },
        }
    }
}

/// Exit code to propagate for a failed child.
pub fn failure_exit_code(code: Option<i32>) -> i32 {
    match code {
        Some(code) if code != exit_codes::OK => code,
        _ => exit_codes::FAILURE,
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            AbortReason::MissingPackage(path) => {
                write!(f, "{} does not exist, exiting", path.display())
            }
            AbortReason::CommandFailed {
                program,
                code: Some(code),
                ..
            } => write!(f, "{program} failed, returned {code}"),
            AbortReason::CommandFailed {
                program,
                code: None,
                ..
            } => write!(f, "{program} failed, terminated by signal"),
        }
    }
}
