use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sideload::deploy::{DeployOutcome, DeployPlan, MediaStatus, run_deploy};
use sideload::exit_codes;
use sideload::io::bridge::{AdbBridge, DryRunBridge};
use sideload::io::config::{DeployConfig, load_config};
use sideload::logging;

#[derive(Parser)]
#[command(
    name = "sideload",
    version,
    about = "Install every .apk under the current directory and push sdcard_SDK to the device"
)]
struct Cli {
    /// Load settings from a TOML file (defaults apply to anything it omits).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Device-bridge executable.
    #[arg(long, value_name = "PROGRAM")]
    adb: Option<String>,

    /// Directory scanned for packages.
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Local media directory to push.
    #[arg(long, value_name = "DIR")]
    media_dir: Option<PathBuf>,

    /// Destination path on the device.
    #[arg(long, value_name = "PATH")]
    device_path: Option<String>,

    /// Do not push the media directory.
    #[arg(long)]
    skip_media: bool,

    /// Print the commands without running them.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<DeployConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DeployConfig::default(),
        };
        if let Some(adb) = &self.adb {
            config.bridge.program = adb.clone();
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(media_dir) = &self.media_dir {
            config.media.source_dir = media_dir.clone();
        }
        if let Some(device_path) = &self.device_path {
            config.media.device_path = device_path.clone();
        }
        config.validate().context("invalid command-line overrides")?;
        Ok(config)
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    let plan = DeployPlan {
        push_media: !cli.skip_media,
        ..DeployPlan::from_config(&config)
    };

    let print_line = |line: &str| println!("Executing: {line} ");
    let outcome = if cli.dry_run {
        run_deploy(&DryRunBridge::new(&config.bridge), &plan, print_line)?
    } else {
        run_deploy(&AdbBridge::new(&config.bridge), &plan, print_line)?
    };

    match &outcome {
        DeployOutcome::Completed(summary) => {
            println!("Installed {} package(s)", summary.installed.len());
            match summary.media {
                MediaStatus::Pushed => println!("Pushed {}", plan.media_source.display()),
                MediaStatus::Absent => {
                    println!("No {} directory, media push skipped", plan.media_source.display());
                }
                MediaStatus::Skipped => println!("Media push disabled"),
            }
        }
        DeployOutcome::Aborted { abort, .. } => eprintln!("{abort}"),
    }
    Ok(outcome.exit_code())
}
