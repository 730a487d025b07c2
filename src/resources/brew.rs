//! Homebrew: the package manager itself and its cask/formula installers.
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context as _, Result};

use super::{Installer, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Official install script.
pub const INSTALL_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Where the install script puts `brew` when it is not on `PATH` yet.
const KNOWN_LOCATIONS: &[&str] = &[
    "/opt/homebrew/bin/brew",
    "/usr/local/bin/brew",
    "/home/linuxbrew/.linuxbrew/bin/brew",
];

/// Find the `brew` executable: `PATH` first, then the default prefixes.
#[must_use]
pub fn locate(executor: &dyn Executor) -> Option<String> {
    if executor.which("brew") {
        return Some("brew".to_string());
    }
    KNOWN_LOCATIONS
        .iter()
        .find(|p| Path::new(p).exists())
        .map(|p| (*p).to_string())
}

/// Homebrew itself, installed non-interactively when absent.
#[derive(Debug)]
pub struct HomebrewResource<'a> {
    executor: &'a dyn Executor,
}

impl<'a> HomebrewResource<'a> {
    /// Create the resource.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor) -> Self {
        Self { executor }
    }
}

impl Resource for HomebrewResource<'_> {
    fn description(&self) -> String {
        "Homebrew".to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(if locate(self.executor).is_some() {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        let script = self
            .executor
            .run("curl", &["-fsSL", INSTALL_SCRIPT_URL])
            .context("downloading the Homebrew install script")?;
        self.executor
            .run_with_env("/bin/bash", &["-c", &script.stdout], &[("NONINTERACTIVE", "1")])
            .context("running the Homebrew install script")?;
        Ok(ResourceChange::Applied)
    }
}

/// Which Homebrew package namespace an installer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrewKind {
    /// GUI applications (macOS only).
    Cask,
    /// Command-line formulae.
    Formula,
}

impl BrewKind {
    const fn flag(self) -> &'static str {
        match self {
            Self::Cask => "--cask",
            Self::Formula => "--formula",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Cask => "cask",
            Self::Formula => "formula",
        }
    }
}

impl std::fmt::Display for BrewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Query every installed package of `kind` in a single command.
///
/// # Errors
///
/// Returns an error if `brew list` cannot be run or exits non-zero.
pub fn installed_packages(
    brew: &str,
    kind: BrewKind,
    executor: &dyn Executor,
) -> Result<HashSet<String>> {
    let result = executor
        .run(brew, &["list", kind.flag(), "-1"])
        .with_context(|| format!("listing installed {kind}s"))?;
    Ok(result
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Probe + install for one [`BrewKind`].
///
/// The installed set is queried once, on the first probe, and updated as
/// items are installed.
#[derive(Debug)]
pub struct BrewInstaller<'a> {
    kind: BrewKind,
    brew: String,
    executor: &'a dyn Executor,
    installed: Mutex<Option<HashSet<String>>>,
}

impl<'a> BrewInstaller<'a> {
    /// Create an installer that runs `brew` (a name on `PATH` or a full path).
    #[must_use]
    pub fn new(kind: BrewKind, brew: &str, executor: &'a dyn Executor) -> Self {
        Self {
            kind,
            brew: brew.to_string(),
            executor,
            installed: Mutex::new(None),
        }
    }
}

/// Tapped names like `homebrew/cask-fonts/font-fira-code` list as their last
/// segment.
fn short_name(item: &str) -> &str {
    item.rsplit('/').next().unwrap_or(item)
}

impl Installer for BrewInstaller<'_> {
    fn name(&self) -> &str {
        self.kind.label()
    }

    fn probe(&self, item: &str) -> Result<bool> {
        let mut cache = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.is_none() {
            *cache = Some(installed_packages(&self.brew, self.kind, self.executor)?);
        }
        Ok(cache
            .as_ref()
            .is_some_and(|set| set.contains(item) || set.contains(short_name(item))))
    }

    fn install(&self, item: &str) -> Result<String> {
        self.executor
            .run(&self.brew, &["install", self.kind.flag(), item])?;
        if let Some(set) = self
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            set.insert(short_name(item).to_string());
        }
        Ok(self.kind.label().to_string())
    }
}
