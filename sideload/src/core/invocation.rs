//! Device-bridge command shapes.

use std::ffi::OsString;
use std::path::PathBuf;

/// Flag passed to `install` so an already-installed package is replaced.
pub const REINSTALL_FLAG: &str = "-r";

/// One call to the device-bridge tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `<tool> install -r <package>`
    Install { package: PathBuf },
    /// `<tool> push <source> <device_path>`
    Push {
        source: PathBuf,
        device_path: String,
    },
}

impl Invocation {
    pub fn install(package: impl Into<PathBuf>) -> Self {
        Self::Install {
            package: package.into(),
        }
    }

    pub fn push(source: impl Into<PathBuf>, device_path: impl Into<String>) -> Self {
        Self::Push {
            source: source.into(),
            device_path: device_path.into(),
        }
    }

    /// Subcommand name (`install` / `push`).
    pub fn subcommand(&self) -> &'static str {
        match self {
            Self::Install { .. } => "install",
            Self::Push { .. } => "push",
        }
    }

    /// Arguments following the program name.
    pub fn args(&self) -> Vec<OsString> {
        match self {
            Self::Install { package } => vec![
                self.subcommand().into(),
                REINSTALL_FLAG.into(),
                package.clone().into_os_string(),
            ],
            Self::Push {
                source,
                device_path,
            } => vec![
                self.subcommand().into(),
                source.clone().into_os_string(),
                device_path.into(),
            ],
        }
    }

    /// Human-readable command line, e.g. `adb install -r ./app.apk`.
    pub fn command_line(&self, program: &str) -> String {
        let mut line = program.to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}
