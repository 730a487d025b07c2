//! Global npm packages.
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context as _, Result};
use serde::Deserialize;
use serde::de::IgnoredAny;

use super::Installer;
use super::node::{NvmShell, shell_quote};
use crate::exec::{ExecResult, Executor};

/// Shape of `npm ls -g --depth=0 --json`.
#[derive(Debug, Deserialize)]
struct NpmList {
    #[serde(default)]
    dependencies: HashMap<String, IgnoredAny>,
}

/// Package name of an install spec: `typescript@5` → `typescript`,
/// `@angular/cli@17` → `@angular/cli`.
#[must_use]
pub fn package_name(spec: &str) -> &str {
    let search_from = usize::from(spec.starts_with('@'));
    spec.get(search_from..)
        .and_then(|rest| rest.find('@'))
        .and_then(|at| spec.get(..at + search_from))
        .unwrap_or(spec)
}

/// Parse the JSON listing into the set of installed package names.
///
/// # Errors
///
/// Returns an error if `json` is not a valid listing.
pub fn parse_listing(json: &str) -> Result<HashSet<String>> {
    let list: NpmList = serde_json::from_str(json).context("parsing npm ls output")?;
    Ok(list.dependencies.into_keys().collect())
}

/// Installs packages with `npm install -g`.
///
/// npm is run directly when it is on `PATH`, otherwise through nvm.
#[derive(Debug)]
pub struct NpmInstaller<'a> {
    executor: &'a dyn Executor,
    nvm: Option<NvmShell<'a>>,
    installed: Mutex<Option<HashSet<String>>>,
}

impl<'a> NpmInstaller<'a> {
    /// Create an installer; `nvm` is used when `npm` is not on `PATH`.
    #[must_use]
    pub fn new(executor: &'a dyn Executor, nvm: Option<NvmShell<'a>>) -> Self {
        Self {
            executor,
            nvm: nvm.filter(|_| !executor.which("npm")),
            installed: Mutex::new(None),
        }
    }

    fn npm(&self, args: &[&str], checked: bool) -> Result<ExecResult> {
        match (&self.nvm, checked) {
            (Some(shell), true) => shell.run(&npm_command_line(args)),
            (Some(shell), false) => shell.run_unchecked(&npm_command_line(args)),
            (None, true) => self.executor.run("npm", args),
            (None, false) => self.executor.run_unchecked("npm", args),
        }
    }

    /// Every globally installed package, in a single query.
    ///
    /// # Errors
    ///
    /// Returns an error if npm cannot be run or its output is not JSON.
    pub fn installed_packages(&self) -> Result<HashSet<String>> {
        // npm ls exits non-zero on peer dependency problems but still lists.
        let result = self.npm(&["ls", "-g", "--depth=0", "--json"], false)?;
        parse_listing(&result.stdout)
    }
}

fn npm_command_line(args: &[&str]) -> String {
    let mut line = "npm".to_string();
    for a in args {
        line.push(' ');
        line.push_str(&shell_quote(a));
    }
    line
}

impl Installer for NpmInstaller<'_> {
    fn name(&self) -> &str {
        "npm"
    }

    fn probe(&self, item: &str) -> Result<bool> {
        let mut cache = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.is_none() {
            *cache = Some(self.installed_packages()?);
        }
        Ok(cache
            .as_ref()
            .is_some_and(|set| set.contains(package_name(item))))
    }

    fn install(&self, item: &str) -> Result<String> {
        self.npm(&["install", "-g", item], true)?;
        if let Some(set) = self
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            set.insert(package_name(item).to_string());
        }
        Ok("npm".to_string())
    }
}
