//! Terminal theme file, copied into place and imported.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use sha2::{Digest as _, Sha256};

use super::helpers::fs as fs_helpers;
use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// SHA-256 of a file's contents, lower-case hex.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// A theme file installed into a themes directory.
///
/// On macOS the installed copy is opened with `open`, which imports it into
/// Terminal.app.
#[derive(Debug)]
pub struct TerminalThemeResource<'a> {
    source: PathBuf,
    dest: PathBuf,
    import: bool,
    executor: &'a dyn Executor,
}

impl<'a> TerminalThemeResource<'a> {
    /// Create a resource copying `source` into `themes_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` has no file name.
    pub fn new(
        source: &Path,
        themes_dir: &Path,
        import: bool,
        executor: &'a dyn Executor,
    ) -> Result<Self> {
        let Some(name) = source.file_name() else {
            bail!("theme path has no file name: {}", source.display());
        };
        Ok(Self {
            source: source.to_path_buf(),
            dest: themes_dir.join(name),
            import,
            executor,
        })
    }

    /// Where the theme is installed.
    #[must_use]
    pub fn dest(&self) -> &Path {
        &self.dest
    }
}

impl Resource for TerminalThemeResource<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.dest.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if !self.dest.exists() {
            return Ok(ResourceState::Missing);
        }
        let installed = file_digest(&self.dest)?;
        Ok(if installed == file_digest(&self.source)? {
            ResourceState::Correct
        } else {
            ResourceState::Incorrect {
                current: format!("sha256 {}", installed.get(..12).unwrap_or(&installed)),
            }
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        if matches!(self.current_state()?, ResourceState::Correct) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        fs_helpers::ensure_parent_dir(&self.dest)?;
        std::fs::copy(&self.source, &self.dest).with_context(|| {
            format!(
                "copying {} to {}",
                self.source.display(),
                self.dest.display()
            )
        })?;
        if self.import {
            self.executor
                .run("open", &[&self.dest.to_string_lossy()])
                .context("importing theme")?;
        }
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    struct Fixture {
        _dir: tempfile::TempDir,
        source: PathBuf,
        themes: PathBuf,
    }

    fn fixture(content: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("repo/themes/terminal.terminal");
        fs_helpers::write_file(&source, content).unwrap();
        let themes = dir.path().join("home/.config/devstrap/themes");
        Fixture {
            source,
            themes,
            _dir: dir,
        }
    }

    #[test]
    fn digest_is_sha256_hex() {
        let f = fixture("abc");
        assert_eq!(
            file_digest(&f.source).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn copies_and_imports() {
        let f = fixture("<plist/>");
        let executor = MockExecutor::ok("");
        let r = TerminalThemeResource::new(&f.source, &f.themes, true, &executor).unwrap();
        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(r.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(r.dest(), f.themes.join("terminal.terminal"));
        assert_eq!(
            executor.calls(),
            vec![format!("open {}", r.dest().display())]
        );
    }

    #[test]
    fn no_import_off_macos() {
        let f = fixture("<plist/>");
        let executor = MockExecutor::default();
        let r = TerminalThemeResource::new(&f.source, &f.themes, false, &executor).unwrap();
        r.apply().unwrap();
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn changed_source_is_incorrect() {
        let f = fixture("v1");
        let executor = MockExecutor::default();
        let r = TerminalThemeResource::new(&f.source, &f.themes, false, &executor).unwrap();
        r.apply().unwrap();
        std::fs::write(&f.source, "v2").unwrap();
        assert!(matches!(r.current_state().unwrap(), ResourceState::Incorrect { .. }));
        assert_eq!(r.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_to_string(r.dest()).unwrap(), "v2");
    }

    #[test]
    fn identical_copy_is_already_correct() {
        let f = fixture("same");
        let executor = MockExecutor::default();
        let r = TerminalThemeResource::new(&f.source, &f.themes, false, &executor).unwrap();
        r.apply().unwrap();
        assert_eq!(r.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }
}
