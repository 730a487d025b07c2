//! Host operating system detection.
use std::fmt;
use std::path::{Path, PathBuf};

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Apple macOS.
    MacOs,
    /// Linux (Homebrew on Linux).
    Linux,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Self { os: Os::MacOs }
        } else {
            // Other Unix-like systems are treated like Linux.
            Self { os: Os::Linux }
        }
    }

    /// Create a platform with an explicit OS.
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Whether this is macOS.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::MacOs
    }

    /// Homebrew casks are macOS-only.
    #[must_use]
    pub fn supports_casks(&self) -> bool {
        self.is_macos()
    }

    /// Location of the VS Code user `settings.json` under `home`.
    #[must_use]
    pub fn vscode_settings_path(&self, home: &Path) -> PathBuf {
        match self.os {
            Os::MacOs => home.join("Library/Application Support/Code/User/settings.json"),
            Os::Linux => home.join(".config/Code/User/settings.json"),
        }
    }
}
