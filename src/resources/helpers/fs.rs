//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Path of the backup written next to `path` (`settings.json` →
/// `settings.json.bak`).
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Copy an existing file to its [`backup_path`], replacing any older backup.
///
/// Returns the backup path, or `None` if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the copy fails.
pub fn backup(path: &Path) -> Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let dest = backup_path(path);
    std::fs::copy(path, &dest)
        .with_context(|| format!("backing up {} to {}", path.display(), dest.display()))?;
    Ok(Some(dest))
}

/// Write `contents` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or the write fails.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
