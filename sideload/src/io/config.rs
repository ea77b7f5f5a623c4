//! Deploy configuration, optionally loaded from a TOML file via `--config`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Deploy configuration (TOML).
///
/// Missing fields default to the values a bare `sideload` run uses, so an
/// empty file is equivalent to no file at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeployConfig {
    /// Directory tree scanned for package files.
    pub root: PathBuf,

    /// File-name suffix identifying a package (case-sensitive).
    pub package_suffix: String,

    pub bridge: BridgeConfig,

    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Device-bridge executable, resolved through `PATH` when not absolute.
    pub program: String,

    /// Keep at most this many bytes of a command's stderr for diagnostics.
    pub stderr_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MediaConfig {
    /// Local directory pushed to the device when it exists.
    pub source_dir: PathBuf,

    /// Destination on the device.
    pub device_path: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: "adb".to_string(),
            stderr_limit_bytes: 100_000,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("sdcard_SDK"),
            device_path: "/sdcard/".to_string(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./"),
            package_suffix: ".apk".to_string(),
            bridge: BridgeConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl DeployConfig {
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(anyhow!("root must not be empty"));
        }
        if self.package_suffix.is_empty() {
            return Err(anyhow!("package_suffix must not be empty"));
        }
        if self.bridge.program.trim().is_empty() {
            return Err(anyhow!("bridge.program must not be empty"));
        }
        if self.bridge.stderr_limit_bytes == 0 {
            return Err(anyhow!("bridge.stderr_limit_bytes must be > 0"));
        }
        if self.media.source_dir.as_os_str().is_empty() {
            return Err(anyhow!("media.source_dir must not be empty"));
        }
        if self.media.device_path.trim().is_empty() {
            return Err(anyhow!("media.device_path must not be empty"));
        }
        Ok(())
    }
}

/// Load and validate config from a TOML file.
pub fn load_config(path: &Path) -> Result<DeployConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DeployConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
