//! Install-then-push orchestration for a `sideload` run.
//!
//! Every phase reports an explicit outcome. A failed step yields an [`Abort`]
//! that travels back up to `main`, which turns it into the process exit code.
//! `Err` is reserved for failures to run anything at all (spawn errors).

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::core::abort::Abort;
use crate::core::invocation::Invocation;
use crate::exit_codes;
use crate::io::bridge::DeviceBridge;
use crate::io::config::DeployConfig;
use crate::io::scan::package_files;

/// What a run should do, resolved from config and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub root: PathBuf,
    pub package_suffix: String,
    pub media_source: PathBuf,
    pub device_path: String,
    pub push_media: bool,
}

impl DeployPlan {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            root: config.root.clone(),
            package_suffix: config.package_suffix.clone(),
            media_source: config.media.source_dir.clone(),
            device_path: config.media.device_path.clone(),
            push_media: true,
        }
    }
}

impl Default for DeployPlan {
    fn default() -> Self {
        Self::from_config(&DeployConfig::default())
    }
}

/// Result of a single install or push step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The command ran and exited 0.
    Done,
    /// Nothing to do (media directory absent).
    Skipped,
    /// The run must stop.
    Aborted(Abort),
}

/// Result of the install phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Completed {
        installed: Vec<PathBuf>,
    },
    /// Stopped at the first failure; `installed` holds the packages before it.
    Aborted {
        installed: Vec<PathBuf>,
        abort: Abort,
    },
}

/// What happened to the media directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatus {
    Pushed,
    /// Source directory does not exist.
    Absent,
    /// Disabled with `--skip-media`.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub installed: Vec<PathBuf>,
    pub media: MediaStatus,
}

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Completed(DeploySummary),
    Aborted {
        installed: Vec<PathBuf>,
        abort: Abort,
    },
}

impl DeployOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(_) => exit_codes::OK,
            Self::Aborted { abort, .. } => abort.code,
        }
    }
}

/// Install every package under `plan.root`, then push the media directory.
///
/// `on_execute` receives each command line right before it runs.
#[instrument(skip_all, fields(root = %plan.root.display()))]
pub fn run_deploy<B: DeviceBridge, F: FnMut(&str)>(
    bridge: &B,
    plan: &DeployPlan,
    mut on_execute: F,
) -> Result<DeployOutcome> {
    info!("starting deploy");
    let installed = match install_packages(
        bridge,
        &plan.root,
        &plan.package_suffix,
        &mut on_execute,
    )? {
        InstallOutcome::Completed { installed } => installed,
        InstallOutcome::Aborted { installed, abort } => {
            return Ok(DeployOutcome::Aborted { installed, abort });
        }
    };

    let media = if plan.push_media {
        match push_media(bridge, &plan.media_source, &plan.device_path, &mut on_execute)? {
            StepOutcome::Done => MediaStatus::Pushed,
            StepOutcome::Skipped => MediaStatus::Absent,
            StepOutcome::Aborted(abort) => {
                return Ok(DeployOutcome::Aborted { installed, abort });
            }
        }
    } else {
        debug!("media push disabled");
        MediaStatus::Skipped
    };

    info!(installed = installed.len(), ?media, "deploy finished");
    Ok(DeployOutcome::Completed(DeploySummary { installed, media }))
}

/// Install each package found under `root`, in scan order, stopping at the first failure.
pub fn install_packages<B: DeviceBridge, F: FnMut(&str)>(
    bridge: &B,
    root: &Path,
    suffix: &str,
    mut on_execute: F,
) -> Result<InstallOutcome> {
    let mut installed = Vec::new();
    for package in package_files(root, suffix) {
        match install_package(bridge, &package, &mut on_execute)? {
            StepOutcome::Done => installed.push(package),
            StepOutcome::Skipped => {}
            StepOutcome::Aborted(abort) => {
                return Ok(InstallOutcome::Aborted { installed, abort });
            }
        }
    }
    debug!(count = installed.len(), "install phase complete");
    Ok(InstallOutcome::Completed { installed })
}

/// Install one package with `install -r`.
///
/// A missing file aborts with [`exit_codes::FAILURE`] before any command runs.
pub fn install_package<B: DeviceBridge, F: FnMut(&str)>(
    bridge: &B,
    package: &Path,
    on_execute: F,
) -> Result<StepOutcome> {
    if !package.exists() {
        warn!(package = %package.display(), "package missing");
        return Ok(StepOutcome::Aborted(Abort::missing_package(package)));
    }
    invoke(bridge, &Invocation::install(package), on_execute)
}

/// Push `source` to `device_path` if it exists, otherwise do nothing.
pub fn push_media<B: DeviceBridge, F: FnMut(&str)>(
    bridge: &B,
    source: &Path,
    device_path: &str,
    on_execute: F,
) -> Result<StepOutcome> {
    if !source.exists() {
        debug!(source = %source.display(), "media directory absent, skipping push");
        return Ok(StepOutcome::Skipped);
    }
    invoke(bridge, &Invocation::push(source, device_path), on_execute)
}

fn invoke<B: DeviceBridge, F: FnMut(&str)>(
    bridge: &B,
    invocation: &Invocation,
    mut on_execute: F,
) -> Result<StepOutcome> {
    let command_line = invocation.command_line(bridge.program());
    on_execute(&command_line);
    let result = bridge.run(invocation)?;
    if result.success() {
        return Ok(StepOutcome::Done);
    }
    Ok(StepOutcome::Aborted(Abort::command_failed(
        bridge.program(),
        command_line,
        result.code,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::abort::AbortReason;
    use crate::io::bridge::CommandResult;
    use crate::test_support::{ScriptedBridge, write_tree};

    fn plan_for(root: &Path) -> DeployPlan {
        DeployPlan {
            root: root.to_path_buf(),
            media_source: root.join("sdcard_SDK"),
            ..DeployPlan::default()
        }
    }

    #[test]
    fn default_plan_matches_bare_run() {
        let plan = DeployPlan::default();
        assert_eq!(plan.root, PathBuf::from("./"));
        assert_eq!(plan.package_suffix, ".apk");
        assert_eq!(plan.media_source, PathBuf::from("sdcard_SDK"));
        assert_eq!(plan.device_path, "/sdcard/");
        assert!(plan.push_media);
    }

    #[test]
    fn no_packages_means_no_installs_and_success() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &["readme.txt", "src/main.cpp"]).expect("tree");
        let bridge = ScriptedBridge::succeeding();

        let outcome = run_deploy(&bridge, &plan_for(temp.path()), |_| {}).expect("deploy");

        assert!(bridge.calls().is_empty());
        assert_eq!(outcome.exit_code(), exit_codes::OK);
        assert_eq!(
            outcome,
            DeployOutcome::Completed(DeploySummary {
                installed: Vec::new(),
                media: MediaStatus::Absent,
            })
        );
    }

    #[test]
    fn installs_each_package_once_in_scan_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &["a/app1.apk", "b/app2.apk", "readme.txt"]).expect("tree");
        let bridge = ScriptedBridge::succeeding();

        let outcome = install_packages(&bridge, temp.path(), ".apk", |_| {}).expect("install");

        let scanned: Vec<PathBuf> = package_files(temp.path(), ".apk").collect();
        assert_eq!(scanned.len(), 2);
        assert_eq!(bridge.installed(), scanned);
        assert_eq!(
            outcome,
            InstallOutcome::Completed {
                installed: scanned
            }
        );
    }

    #[test]
    fn first_failure_stops_remaining_installs_and_push() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(
            temp.path(),
            &["a/app1.apk", "b/app2.apk", "c/app3.apk", "sdcard_SDK/video.mp4"],
        )
        .expect("tree");
        let bridge = ScriptedBridge::new(vec![CommandResult::exited(5)]);

        let outcome = run_deploy(&bridge, &plan_for(temp.path()), |_| {}).expect("deploy");

        assert_eq!(bridge.calls().len(), 1);
        assert_eq!(bridge.pushes(), 0);
        assert_eq!(outcome.exit_code(), 5);
        let DeployOutcome::Aborted { installed, abort } = outcome else {
            panic!("expected abort");
        };
        assert!(installed.is_empty());
        assert!(matches!(
            abort.reason,
            AbortReason::CommandFailed { code: Some(5), .. }
        ));
    }

    #[test]
    fn failure_midway_keeps_earlier_installs() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &["a/app1.apk", "b/app2.apk", "c/app3.apk"]).expect("tree");
        let bridge = ScriptedBridge::new(vec![CommandResult::ok(), CommandResult::exited(9)]);

        let outcome = install_packages(&bridge, temp.path(), ".apk", |_| {}).expect("install");

        let calls = bridge.installed();
        assert_eq!(calls.len(), 2);
        let InstallOutcome::Aborted { installed, abort } = outcome else {
            panic!("expected abort");
        };
        assert_eq!(installed, vec![calls[0].clone()]);
        assert_eq!(abort.code, 9);
    }

    #[test]
    fn missing_package_aborts_without_running_anything() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("gone.apk");
        let bridge = ScriptedBridge::succeeding();
        let mut lines = Vec::new();

        let outcome = install_package(&bridge, &missing, |line| lines.push(line.to_string()))
            .expect("install");

        assert!(bridge.calls().is_empty());
        assert!(lines.is_empty());
        let StepOutcome::Aborted(abort) = outcome else {
            panic!("expected abort");
        };
        assert_eq!(abort.code, exit_codes::FAILURE);
        assert_eq!(abort.reason, AbortReason::MissingPackage(missing));
    }

    #[test]
    fn media_absent_skips_push() {
        let temp = tempfile::tempdir().expect("tempdir");
        let bridge = ScriptedBridge::succeeding();

        let outcome = push_media(&bridge, &temp.path().join("sdcard_SDK"), "/sdcard/", |_| {})
            .expect("push");

        assert_eq!(outcome, StepOutcome::Skipped);
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn media_present_pushes_once_to_device_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &["app.apk", "sdcard_SDK/Oculus/Movies/clip.mp4"]).expect("tree");
        let bridge = ScriptedBridge::succeeding();
        let mut lines = Vec::new();

        let outcome = run_deploy(&bridge, &plan_for(temp.path()), |line| {
            lines.push(line.to_string());
        })
        .expect("deploy");

        assert_eq!(bridge.pushes(), 1);
        assert_eq!(
            bridge.calls().last(),
            Some(&Invocation::push(temp.path().join("sdcard_SDK"), "/sdcard/"))
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("adb install -r "));
        assert!(lines[1].starts_with("adb push "));
        assert!(lines[1].ends_with(" /sdcard/"));
        assert_eq!(
            outcome,
            DeployOutcome::Completed(DeploySummary {
                installed: vec![temp.path().join("app.apk")],
                media: MediaStatus::Pushed,
            })
        );
    }

    #[test]
    fn push_failure_propagates_code() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &["sdcard_SDK/"]).expect("tree");
        let bridge = ScriptedBridge::new(vec![CommandResult::exited(2)]);

        let outcome = run_deploy(&bridge, &plan_for(temp.path()), |_| {}).expect("deploy");

        assert_eq!(outcome.exit_code(), 2);
        assert_eq!(bridge.pushes(), 1);
    }

    #[test]
    fn skip_media_never_pushes() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &["sdcard_SDK/a.png"]).expect("tree");
        let bridge = ScriptedBridge::succeeding();
        let plan = DeployPlan {
            push_media: false,
            ..plan_for(temp.path())
        };

        let outcome = run_deploy(&bridge, &plan, |_| {}).expect("deploy");

        assert_eq!(bridge.pushes(), 0);
        assert_eq!(
            outcome,
            DeployOutcome::Completed(DeploySummary {
                installed: Vec::new(),
                media: MediaStatus::Skipped,
            })
        );
    }

    #[test]
    fn signal_terminated_child_aborts_with_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_tree(temp.path(), &["app.apk"]).expect("tree");
        let bridge = ScriptedBridge::new(vec![CommandResult {
            code: None,
            stderr: String::new(),
        }]);

        let outcome = run_deploy(&bridge, &plan_for(temp.path()), |_| {}).expect("deploy");

        assert_eq!(outcome.exit_code(), exit_codes::FAILURE);
    }
}
