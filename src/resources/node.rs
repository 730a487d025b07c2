//! Node.js through nvm.
//!
//! nvm is a shell function, so every nvm command runs as
//! `bash -c '. "$NVM_DIR/nvm.sh" && ...'`.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use super::{Installer, Resource, ResourceChange, ResourceState};
use crate::exec::{ExecResult, Executor};

/// nvm install script, pinned to a release.
pub const NVM_INSTALL_URL: &str = "https://raw.githubusercontent.com/nvm-sh/nvm/v0.40.1/install.sh";

/// nvm's spec for the newest release.
const LATEST: &str = "node";

/// Quote `s` for inclusion in a POSIX shell command line.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Runs commands in a shell with nvm loaded.
#[derive(Debug, Clone, Copy)]
pub struct NvmShell<'a> {
    nvm_dir: &'a Path,
    executor: &'a dyn Executor,
}

impl<'a> NvmShell<'a> {
    /// Create a shell for the nvm installation in `nvm_dir`.
    #[must_use]
    pub const fn new(nvm_dir: &'a Path, executor: &'a dyn Executor) -> Self {
        Self { nvm_dir, executor }
    }

    /// Path of the `nvm.sh` script.
    #[must_use]
    pub fn script(&self) -> PathBuf {
        self.nvm_dir.join("nvm.sh")
    }

    /// Whether nvm is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.script().is_file()
    }

    fn command_line(&self, command: &str) -> String {
        format!(
            ". {} && {command}",
            shell_quote(&self.script().to_string_lossy())
        )
    }

    /// Run `command` with nvm loaded, failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be spawned or the command fails.
    pub fn run(&self, command: &str) -> Result<ExecResult> {
        self.executor
            .run("bash", &["-c", &self.command_line(command)])
    }

    /// Run `command` with nvm loaded, returning the result regardless of exit
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell cannot be spawned or times out.
    pub fn run_unchecked(&self, command: &str) -> Result<ExecResult> {
        self.executor
            .run_unchecked("bash", &["-c", &self.command_line(command)])
    }
}

/// nvm itself, installed through its install script.
#[derive(Debug)]
pub struct NvmResource<'a> {
    shell: NvmShell<'a>,
}

impl<'a> NvmResource<'a> {
    /// Create the resource.
    #[must_use]
    pub const fn new(shell: NvmShell<'a>) -> Self {
        Self { shell }
    }
}

impl Resource for NvmResource<'_> {
    fn description(&self) -> String {
        format!("nvm in {}", self.shell.nvm_dir.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(if self.shell.is_installed() {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        std::fs::create_dir_all(self.shell.nvm_dir)
            .with_context(|| format!("creating {}", self.shell.nvm_dir.display()))?;
        let script = self
            .shell
            .executor
            .run("curl", &["-fsSL", NVM_INSTALL_URL])
            .context("downloading the nvm install script")?;
        let dir = self.shell.nvm_dir.to_string_lossy();
        self.shell
            .executor
            .run_with_env("bash", &["-c", &script.stdout], &[("NVM_DIR", dir.as_ref())])
            .context("running the nvm install script")?;
        if !self.shell.is_installed() {
            bail!("nvm install script finished but {} is missing", self.shell.script().display());
        }
        Ok(ResourceChange::Applied)
    }
}

/// Probe + install for Node.js versions, given as nvm specs (`node`, `20`,
/// `v18.19.0`).
#[derive(Debug)]
pub struct NodeInstaller<'a> {
    shell: NvmShell<'a>,
}

impl<'a> NodeInstaller<'a> {
    /// Create an installer using `shell`.
    #[must_use]
    pub const fn new(shell: NvmShell<'a>) -> Self {
        Self { shell }
    }

    /// Version nvm resolves `spec` to, locally or from the remote index.
    fn resolve(&self, subcommand: &str, spec: &str) -> Result<Option<String>> {
        let result = self
            .shell
            .run_unchecked(&format!("nvm {subcommand} {}", shell_quote(spec)))?;
        let version = result.stdout.trim();
        Ok((result.success && !version.is_empty() && version != "N/A")
            .then(|| version.to_string()))
    }
}

impl Installer for NodeInstaller<'_> {
    fn name(&self) -> &str {
        "nvm"
    }

    fn probe(&self, item: &str) -> Result<bool> {
        let Some(local) = self.resolve("version", item)? else {
            return Ok(false);
        };
        if item != LATEST {
            return Ok(true);
        }
        let remote = self
            .resolve("version-remote", item)?
            .context("could not resolve the latest Node.js release")?;
        Ok(local == remote)
    }

    fn install(&self, item: &str) -> Result<String> {
        let spec = shell_quote(item);
        self.shell
            .run(&format!("nvm install {spec} && nvm alias default {spec}"))?;
        Ok("nvm".to_string())
    }
}
