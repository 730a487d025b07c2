//! VS Code extension installer.
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use anyhow::{Result, bail};

use super::Installer;
use crate::exec::Executor;

/// Find the VS Code CLI command, preferring code-insiders.
#[must_use]
pub fn find_code_command(executor: &dyn Executor) -> Option<String> {
    ["code-insiders", "code"]
        .into_iter()
        .find(|cmd| executor.which(cmd))
        .map(str::to_string)
}

/// Query the full set of installed VS Code extension IDs in a single command.
///
/// Returns a `HashSet` of **lower-cased** extension IDs.
///
/// # Errors
///
/// Returns an error if the VS Code command fails to execute or exits with a
/// non-zero status code.
pub fn installed_extensions(code_cmd: &str, executor: &dyn Executor) -> Result<HashSet<String>> {
    let result = executor.run(code_cmd, &["--list-extensions"])?;
    Ok(result
        .stdout
        .lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .collect())
}

/// Installs extensions through the VS Code CLI.
///
/// Extension IDs compare case-insensitively.
#[derive(Debug)]
pub struct VsCodeExtensionInstaller<'a> {
    code_cmd: String,
    executor: &'a dyn Executor,
    installed: Mutex<Option<HashSet<String>>>,
}

impl<'a> VsCodeExtensionInstaller<'a> {
    /// Create an installer for the given CLI (`code` or `code-insiders`).
    #[must_use]
    pub fn new(code_cmd: &str, executor: &'a dyn Executor) -> Self {
        Self {
            code_cmd: code_cmd.to_string(),
            executor,
            installed: Mutex::new(None),
        }
    }
}

impl Installer for VsCodeExtensionInstaller<'_> {
    fn name(&self) -> &str {
        &self.code_cmd
    }

    fn probe(&self, item: &str) -> Result<bool> {
        let mut cache = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.is_none() {
            *cache = Some(installed_extensions(&self.code_cmd, self.executor)?);
        }
        Ok(cache
            .as_ref()
            .is_some_and(|set| set.contains(&item.to_lowercase())))
    }

    fn install(&self, item: &str) -> Result<String> {
        let result = self
            .executor
            .run_unchecked(&self.code_cmd, &["--install-extension", item, "--force"])?;
        if !result.success {
            bail!("failed to install: {}", result.stderr.trim());
        }
        Ok(self.code_cmd.clone())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn find_code_command_prefers_insiders() {
        let executor = MockExecutor::default().with_which(&["code", "code-insiders"]);
        assert_eq!(find_code_command(&executor).as_deref(), Some("code-insiders"));
    }

    #[test]
    fn find_code_command_falls_back_to_code() {
        let executor = MockExecutor::default().with_which(&["code"]);
        assert_eq!(find_code_command(&executor).as_deref(), Some("code"));
    }

    #[test]
    fn find_code_command_none() {
        assert_eq!(find_code_command(&MockExecutor::default()), None);
    }

    #[test]
    fn installed_extensions_lowercases() {
        let executor = MockExecutor::ok("GitHub.Copilot\nesbenp.prettier-vscode\n\n");
        let set = installed_extensions("code", &executor).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("github.copilot"));
    }

    #[test]
    fn probe_case_insensitive_and_cached() {
        let executor = MockExecutor::ok("github.copilot\n");
        let installer = VsCodeExtensionInstaller::new("code", &executor);
        assert!(installer.probe("GitHub.Copilot").unwrap());
        assert!(!installer.probe("ms-python.python").unwrap());
        assert_eq!(executor.call_count(), 1);
    }

    #[test]
    fn install_uses_force() {
        let executor = MockExecutor::ok("");
        let installer = VsCodeExtensionInstaller::new("code", &executor);
        assert_eq!(installer.install("ms-python.python").unwrap(), "code");
        assert_eq!(
            executor.calls(),
            vec!["code --install-extension ms-python.python --force"]
        );
    }

    #[test]
    fn install_failure_is_error() {
        let executor = MockExecutor::fail();
        let installer = VsCodeExtensionInstaller::new("code", &executor);
        assert!(installer.install("bad.ext").is_err());
    }
}
