//! Device-bridge abstraction.
//!
//! The [`DeviceBridge`] trait decouples deploy orchestration from the actual
//! tool (`adb`). Tests use a scripted bridge that records invocations and
//! replays exit codes without spawning processes.

use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::invocation::Invocation;
use crate::io::config::BridgeConfig;
use crate::io::process::run_command;

/// Outcome of one bridge command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, `None` when the child was killed by a signal.
    pub code: Option<i32>,
    /// Captured stderr (possibly truncated).
    pub stderr: String,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self::exited(0)
    }

    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            stderr: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Abstraction over device-bridge backends.
pub trait DeviceBridge {
    /// Program name used in `Executing: ...` lines and failure diagnostics.
    fn program(&self) -> &str;

    /// Run one invocation to completion.
    ///
    /// A non-zero exit is reported through [`CommandResult`], not as an error;
    /// `Err` means the command could not be run at all.
    fn run(&self, invocation: &Invocation) -> Result<CommandResult>;
}

/// Bridge that spawns the configured `adb` executable.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: String,
    stderr_limit_bytes: usize,
}

impl AdbBridge {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            program: config.program.clone(),
            stderr_limit_bytes: config.stderr_limit_bytes,
        }
    }
}

impl DeviceBridge for AdbBridge {
    fn program(&self) -> &str {
        &self.program
    }

    #[instrument(skip_all, fields(program = %self.program, subcommand = invocation.subcommand()))]
    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        let mut cmd = Command::new(&self.program);
        cmd.args(invocation.args());

        let output = run_command(cmd, self.stderr_limit_bytes)
            .with_context(|| format!("run {}", invocation.command_line(&self.program)))?;

        let label = invocation.subcommand();
        let stderr = format!(
            "{}{}",
            output.stderr_lossy(),
            output.stderr_truncated_notice(label)
        );
        if output.status.success() {
            debug!("bridge command succeeded");
        } else {
            warn!(
                exit_code = ?output.code(),
                stderr = %stderr.trim(),
                "bridge command failed"
            );
        }

        Ok(CommandResult {
            code: output.code(),
            stderr,
        })
    }
}

/// Bridge that runs nothing and reports success for every invocation.
#[derive(Debug, Clone)]
pub struct DryRunBridge {
    program: String,
}

impl DryRunBridge {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            program: config.program.clone(),
        }
    }
}

impl DeviceBridge for DryRunBridge {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        debug!(command = %invocation.command_line(&self.program), "dry run, skipping");
        Ok(CommandResult::ok())
    }
}
