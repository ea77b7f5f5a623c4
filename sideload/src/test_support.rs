//! Test-only helpers: filesystem fixtures and scripted device bridges.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::invocation::Invocation;
use crate::io::bridge::{CommandResult, DeviceBridge};

/// Create each relative path under `root` as a small file, creating parent
/// directories as needed. A trailing `/` creates an empty directory instead.
pub fn write_tree(root: &Path, paths: &[&str]) -> Result<()> {
    for rel in paths {
        let path = root.join(rel);
        if rel.ends_with('/') {
            fs::create_dir_all(&path).with_context(|| format!("create {}", path.display()))?;
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, rel.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

/// Bridge that records every invocation and replays queued results.
///
/// Once the queue is empty every further invocation succeeds.
pub struct ScriptedBridge {
    program: String,
    responses: RefCell<VecDeque<CommandResult>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedBridge {
    pub fn new(responses: Vec<CommandResult>) -> Self {
        Self {
            program: "adb".to_string(),
            responses: RefCell::new(responses.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Bridge where every invocation exits 0.
    pub fn succeeding() -> Self {
        Self::new(Vec::new())
    }

    /// Invocations seen so far, in call order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Packages passed to `install`, in call order.
    pub fn installed(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Invocation::Install { package } => Some(package.clone()),
                Invocation::Push { .. } => None,
            })
            .collect()
    }

    /// Number of `push` invocations.
    pub fn pushes(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Invocation::Push { .. }))
            .count()
    }
}

impl DeviceBridge for ScriptedBridge {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, invocation: &Invocation) -> Result<CommandResult> {
        self.calls.borrow_mut().push(invocation.clone());
        Ok(self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(CommandResult::ok))
    }
}

/// Write an executable shell script standing in for `adb`.
///
/// Each call appends its arguments as one line to `bridge.log` next to the
/// script. Invocations whose arguments contain `fail_match` print to stderr
/// and exit with `fail_code`; all others exit 0.
#[cfg(unix)]
pub fn write_fake_bridge_failing_on(
    dir: &Path,
    fail_match: &str,
    fail_code: i32,
) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-adb");
    let log = fake_bridge_log(dir);
    let body = format!(
        "#!/bin/sh\n\
         echo \"$*\" >> '{log}'\n\
         case \"$*\" in\n\
         *'{fail_match}'*) echo 'fake bridge failure' >&2; exit {fail_code} ;;\n\
         esac\n\
         exit 0\n",
        log = log.display(),
    );
    fs::write(&script, body).with_context(|| format!("write {}", script.display()))?;
    let mut perms = fs::metadata(&script)
        .with_context(|| format!("stat {}", script.display()))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms)
        .with_context(|| format!("chmod {}", script.display()))?;
    Ok(script)
}

/// Fake bridge that exits with `code` on every invocation.
#[cfg(unix)]
pub fn write_fake_bridge(dir: &Path, code: i32) -> Result<PathBuf> {
    if code == 0 {
        write_fake_bridge_failing_on(dir, "__sideload_never_matches__", 1)
    } else {
        write_fake_bridge_failing_on(dir, "", code)
    }
}

/// Path of the argument log written by the fake bridge in `dir`.
pub fn fake_bridge_log(dir: &Path) -> PathBuf {
    dir.join("bridge.log")
}

/// Lines recorded by the fake bridge, empty when it never ran.
pub fn read_fake_bridge_log(dir: &Path) -> Result<Vec<String>> {
    let log = fake_bridge_log(dir);
    if !log.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(&log).with_context(|| format!("read {}", log.display()))?;
    Ok(raw.lines().map(str::to_string).collect())
}
